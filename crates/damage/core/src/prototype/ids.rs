use std::borrow::Borrow;
use std::fmt;

macro_rules! prototype_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

prototype_id!(
    /// Identifier of an atomic damage kind such as `Blunt` or `Heat`.
    DamageTypeId
);

prototype_id!(
    /// Identifier of a named set of damage types, used for grouping and display.
    DamageGroupId
);

prototype_id!(
    /// Identifier of a container definition declaring which types an entity accepts.
    DamageContainerId
);

prototype_id!(
    /// Identifier of a resistance set (coefficients and flat reductions).
    DamageModifierSetId
);
