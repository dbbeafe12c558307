//! Assembly of ordered child collections.

use svd_xml::Node;

use crate::derivation::DerivationIndex;
use crate::element::Element;
use crate::error::SvdError;
use crate::properties::RegisterProperties;

/// Children with `tag`, read directly from `parent` or from its first
/// `container` child. A missing container yields no children.
pub(crate) fn children<'a>(parent: &'a Node, container: Option<&str>, tag: &str) -> Vec<&'a Node> {
    let holder = match container {
        Some(container) => match parent.child(container) {
            Some(holder) => holder,
            None => return Vec::new(),
        },
        None => parent,
    };
    holder
        .children()
        .iter()
        .filter(|child| child.tag() == tag)
        .collect()
}

/// Build every `E` below `parent` in document order, resolving `derivedFrom`
/// between the siblings first.
pub(crate) fn collect<E: Element>(
    parent: &Node,
    container: Option<&str>,
    inherited: &RegisterProperties,
) -> Result<Vec<E>, SvdError> {
    let nodes = children(parent, container, E::KIND.tag());
    let mut index = DerivationIndex::new(E::KIND, &nodes);
    nodes
        .iter()
        .map(|node| {
            let resolved = index.resolve(node)?;
            E::from_node(&resolved, inherited)
        })
        .collect()
}

/// Build every `E` below `parent` without derivation.
pub(crate) fn collect_plain<E: Element>(
    parent: &Node,
    container: Option<&str>,
    inherited: &RegisterProperties,
) -> Result<Vec<E>, SvdError> {
    children(parent, container, E::KIND.tag())
        .into_iter()
        .map(|node| E::from_node(node, inherited))
        .collect()
}

/// Build the first `E` child of `parent`, if any.
pub(crate) fn single<E: Element>(
    parent: &Node,
    inherited: &RegisterProperties,
) -> Result<Option<E>, SvdError> {
    parent
        .child(E::KIND.tag())
        .map(|node| E::from_node(node, inherited))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::Interrupt;

    #[test]
    fn empty_containers_give_empty_collections() {
        let parent = svd_xml::parse("<peripheral><registers/></peripheral>").expect("xml");
        assert!(children(&parent, Some("registers"), "register").is_empty());
        assert!(children(&parent, Some("missing"), "register").is_empty());
        let interrupts: Vec<Interrupt> =
            collect(&parent, None, &RegisterProperties::default()).expect("collect");
        assert!(interrupts.is_empty());
    }

    #[test]
    fn document_order_is_kept() {
        let parent = svd_xml::parse(
            r#"<peripheral>
                <interrupt><name>B</name><value>2</value></interrupt>
                <description>ignored</description>
                <interrupt><name>A</name><value>1</value></interrupt>
            </peripheral>"#,
        )
        .expect("xml");
        let interrupts: Vec<Interrupt> =
            collect_plain(&parent, None, &RegisterProperties::default()).expect("collect");
        let names: Vec<&str> = interrupts.iter().map(Interrupt::name).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn singleton_is_optional() {
        let parent = svd_xml::parse("<device/>").expect("xml");
        let interrupt: Option<Interrupt> =
            single(&parent, &RegisterProperties::default()).expect("single");
        assert!(interrupt.is_none());
    }
}
