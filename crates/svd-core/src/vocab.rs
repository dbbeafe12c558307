//! Closed vocabularies of the SVD format.
//!
//! Each vocabulary maps one or more accepted spellings onto a single
//! constant. Lookups outside the accepted set fail with [`UnknownToken`];
//! nothing defaults silently.

use std::fmt;

use thiserror::Error;

/// Text that is not part of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {vocabulary} value '{text}'")]
pub struct UnknownToken {
    /// Name of the vocabulary that was consulted.
    pub vocabulary: &'static str,
    /// Offending text.
    pub text: String,
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident ($vocabulary:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $canonical:literal $(| $alias:literal)*,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $name {
            /// Vocabulary name used in diagnostics.
            pub const VOCABULARY: &'static str = $vocabulary;
            /// Every constant of the vocabulary in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical spelling used in SVD documents.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $canonical,)+
                }
            }

            /// Look up a spelling, accepting canonical and alternate forms.
            pub fn from_token(token: &str) -> Result<Self, UnknownToken> {
                match token.trim() {
                    $($canonical $(| $alias)* => Ok($name::$variant),)+
                    other => Err(UnknownToken {
                        vocabulary: $vocabulary,
                        text: other.to_string(),
                    }),
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_token(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl crate::extract::Decode for $name {
            fn decode(text: &str) -> Result<Self, crate::extract::DecodeError> {
                Ok(Self::from_token(text)?)
            }
        }
    };
}

vocabulary! {
    /// Predefined access rights of registers and fields.
    Access("access") {
        /// Read access is permitted, writes have an undefined result.
        ReadOnly => "read-only",
        /// Write access is permitted, reads have an undefined result.
        WriteOnly => "write-only",
        ReadWrite => "read-write",
        /// Only the first write after reset has an effect, reads are undefined.
        WriteOnce => "writeOnce",
        /// Reads are permitted, only the first write after reset has an effect.
        ReadWriteOnce => "read-writeOnce",
    }
}

impl Access {
    pub const fn is_readable(self) -> bool {
        !matches!(self, Access::WriteOnly | Access::WriteOnce)
    }

    pub const fn is_writable(self) -> bool {
        !matches!(self, Access::ReadOnly)
    }
}

vocabulary! {
    /// Byte order of the processor.
    Endian("endian") {
        Little => "little",
        Big => "big",
        /// Byte order is configurable at reset.
        Selectable => "selectable",
        Other => "other",
    }
}

vocabulary! {
    /// Processor core identifier.
    CpuName("cpu name") {
        CM0 => "CM0",
        CM0Plus => "CM0PLUS" | "CM0+",
        CM1 => "CM1",
        CM3 => "CM3",
        CM4 => "CM4",
        CM7 => "CM7",
        CM23 => "CM23",
        CM33 => "CM33",
        CM35P => "CM35P",
        CM52 => "CM52",
        CM55 => "CM55",
        CM85 => "CM85",
        SC000 => "SC000",
        SC300 => "SC300",
        ARMV8MML => "ARMV8MML",
        ARMV8MBL => "ARMV8MBL",
        ARMV81MML => "ARMV81MML",
        CA5 => "CA5",
        CA7 => "CA7",
        CA8 => "CA8",
        CA9 => "CA9",
        CA15 => "CA15",
        CA17 => "CA17",
        CA53 => "CA53",
        CA57 => "CA57",
        CA72 => "CA72",
        SMC1 => "SMC1",
        Other => "other",
    }
}

impl CpuName {
    /// Cores implementing the Armv8-M security extension (TrustZone).
    pub const fn has_security_extension(self) -> bool {
        matches!(
            self,
            CpuName::CM23
                | CpuName::CM33
                | CpuName::CM35P
                | CpuName::CM52
                | CpuName::CM55
                | CpuName::CM85
                | CpuName::ARMV8MML
                | CpuName::ARMV8MBL
                | CpuName::ARMV81MML
        )
    }
}

vocabulary! {
    /// Usage of an address block.
    AddressBlockUsage("address block usage") {
        Registers => "registers",
        Buffer => "buffer",
        Reserved => "reserved",
    }
}

vocabulary! {
    /// Security/privilege protection level.
    Protection("protection") {
        Secure => "s" | "secure",
        NonSecure => "n" | "non-secure",
        Privileged => "p" | "privileged",
    }
}

vocabulary! {
    /// Security attribution of an SAU region.
    SauAccess("SAU access") {
        NonSecure => "n",
        NonSecureCallableSecure => "c",
        Secure => "s",
    }
}

vocabulary! {
    /// Access type an enumerated value set applies to.
    EnumUsage("enumerated values usage") {
        Read => "read",
        Write => "write",
        ReadWrite => "read-write",
    }
}

vocabulary! {
    /// Side effect of a write on the stored value.
    ModifiedWriteValues("modified write values") {
        OneToClear => "oneToClear",
        OneToSet => "oneToSet",
        OneToToggle => "oneToToggle",
        ZeroToClear => "zeroToClear",
        ZeroToSet => "zeroToSet",
        ZeroToToggle => "zeroToToggle",
        Clear => "clear",
        Set => "set",
        Modify => "modify",
    }
}

vocabulary! {
    /// Side effect of a read on the stored value.
    ReadAction("read action") {
        Clear => "clear",
        Set => "set",
        Modify => "modify",
        ModifyExternal => "modifyExternal",
    }
}

vocabulary! {
    /// C data type used for a register in generated headers.
    DataType("data type") {
        U8 => "uint8_t",
        U16 => "uint16_t",
        U32 => "uint32_t",
        U64 => "uint64_t",
        I8 => "int8_t",
        I16 => "int16_t",
        I32 => "int32_t",
        I64 => "int64_t",
        U8Ptr => "uint8_t *",
        U16Ptr => "uint16_t *",
        U32Ptr => "uint32_t *",
        U64Ptr => "uint64_t *",
        I8Ptr => "int8_t *",
        I16Ptr => "int16_t *",
        I32Ptr => "int32_t *",
        I64Ptr => "int64_t *",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_canonical_spelling_round_trips() {
        for access in Access::ALL {
            assert_eq!(Access::from_token(access.as_str()), Ok(*access));
        }
        for name in CpuName::ALL {
            assert_eq!(name.as_str().parse::<CpuName>(), Ok(*name));
        }
        for data_type in DataType::ALL {
            assert_eq!(DataType::from_token(data_type.as_str()), Ok(*data_type));
        }
    }

    #[test]
    fn alternate_spellings() {
        assert_eq!(Protection::from_token("s"), Ok(Protection::Secure));
        assert_eq!(Protection::from_token("secure"), Ok(Protection::Secure));
        assert_eq!(Protection::from_token("n"), Ok(Protection::NonSecure));
        assert_eq!(Protection::from_token("p"), Ok(Protection::Privileged));
        assert_eq!(CpuName::from_token("CM0+"), Ok(CpuName::CM0Plus));
        assert_eq!(Access::from_token(" read-write "), Ok(Access::ReadWrite));
    }

    #[test]
    fn sau_access_tokens() {
        assert_eq!(SauAccess::from_token("n"), Ok(SauAccess::NonSecure));
        assert_eq!(
            SauAccess::from_token("c"),
            Ok(SauAccess::NonSecureCallableSecure)
        );
        assert_eq!(SauAccess::from_token("s"), Ok(SauAccess::Secure));
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        let err = Access::from_token("read-writeonce").unwrap_err();
        assert_eq!(err.vocabulary, "access");
        assert_eq!(err.text, "read-writeonce");
        assert!(Endian::from_token("Little").is_err());
        assert!(SauAccess::from_token("secure").is_err());
        assert!(EnumUsage::from_token("").is_err());
    }

    #[test]
    fn cpu_traits() {
        assert!(CpuName::CM33.has_security_extension());
        assert!(!CpuName::CM7.has_security_extension());
    }

    #[test]
    fn access_permissions() {
        assert!(Access::ReadOnly.is_readable());
        assert!(!Access::ReadOnly.is_writable());
        assert!(!Access::WriteOnce.is_readable());
        assert!(Access::ReadWriteOnce.is_writable());
    }
}
