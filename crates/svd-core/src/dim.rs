//! Array and list descriptions (`dim` groups).

use tracing::trace;

use crate::error::SvdError;
use crate::extract::Reader;

/// Largest instance count accepted for one dim group.
pub const MAX_DIM: u32 = 1 << 16;

/// Replication of an element `dim` times at a fixed address stride.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DimElement {
    dim: u32,
    increment: u64,
    indices: Vec<String>,
    name: Option<String>,
}

/// One concrete instance of a dim group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimInstance {
    pub name: String,
    pub index: String,
    /// Address offset relative to the first instance.
    pub offset: u64,
}

impl DimElement {
    /// Read the dim group of a node, if it has one.
    pub(crate) fn read(reader: &Reader<'_>) -> Result<Option<Self>, SvdError> {
        let Some(dim) = reader.optional::<u32>("dim")? else {
            return Ok(None);
        };
        if dim == 0 || dim > MAX_DIM {
            return Err(SvdError::malformed(
                reader.kind(),
                format!("dim {dim} is outside 1..={MAX_DIM}"),
            ));
        }
        let increment = reader.required::<u64>("dimIncrement")?;
        if u64::from(dim - 1).checked_mul(increment).is_none() {
            return Err(SvdError::malformed(
                reader.kind(),
                format!("{dim} instances of stride {increment:#x} overflow the address space"),
            ));
        }
        let indices = match reader.optional::<String>("dimIndex")? {
            Some(text) => parse_indices(&text, dim).ok_or_else(|| {
                SvdError::malformed(reader.kind(), format!("invalid dimIndex '{text}'"))
            })?,
            None => (0..dim).map(|i| i.to_string()).collect(),
        };
        if indices.len() != dim as usize {
            return Err(SvdError::malformed(
                reader.kind(),
                format!("dimIndex lists {} entries for dim {dim}", indices.len()),
            ));
        }
        Ok(Some(DimElement {
            dim,
            increment,
            indices,
            name: reader.optional("dimName")?,
        }))
    }

    pub fn dim(&self) -> u32 {
        self.dim
    }

    /// Address stride between consecutive instances.
    pub fn increment(&self) -> u64 {
        self.increment
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// C type name used for the array element, when declared.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Expand `pattern` into one instance per index.
    ///
    /// `[%s]` and `%s` are replaced by the index; a pattern without a
    /// placeholder gets the index appended.
    pub fn instances(&self, pattern: &str) -> Vec<DimInstance> {
        let instances: Vec<DimInstance> = self
            .indices
            .iter()
            .zip(0u64..)
            .map_while(|(index, position)| {
                let offset = position.checked_mul(self.increment)?;
                let name = if pattern.contains("%s") {
                    pattern.replace("[%s]", index).replace("%s", index)
                } else {
                    format!("{pattern}{index}")
                };
                Some(DimInstance {
                    name,
                    index: index.clone(),
                    offset,
                })
            })
            .collect();
        trace!(pattern, count = instances.len(), "expanded dim group");
        instances
    }
}

/// `0-3`, `A-D` or a comma separated list. Numeric ranges longer than
/// `dim` are refused before they are expanded.
fn parse_indices(text: &str, dim: u32) -> Option<Vec<String>> {
    let text = text.trim();
    if let Some((start, end)) = text.split_once('-') {
        let (start, end) = (start.trim(), end.trim());
        if let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) {
            if start > end || end - start >= dim {
                return None;
            }
            return Some((start..=end).map(|i| i.to_string()).collect());
        }
        let mut start_chars = start.chars();
        let mut end_chars = end.chars();
        return match (
            start_chars.next(),
            start_chars.next(),
            end_chars.next(),
            end_chars.next(),
        ) {
            (Some(first), None, Some(last), None)
                if first.is_ascii_uppercase() && last.is_ascii_uppercase() && first <= last =>
            {
                Some((first..=last).map(String::from).collect())
            }
            _ => None,
        };
    }
    let indices: Vec<String> = text.split(',').map(|s| s.trim().to_string()).collect();
    if indices.iter().any(String::is_empty) {
        return None;
    }
    Some(indices)
}
