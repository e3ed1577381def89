//! `define_port_error!`: error enums for driven ports.
//!
//! Variants are either unit-like or carry one `String` field named in
//! braces. Each gets a snake_case constructor, so adapters can write
//! `UserPersistenceError::query(err.to_string())`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };
    (@ctor $variant:ident $field:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($field: impl Into<String>) -> Self {
                Self::$variant { $field: $field.into() }
            }
        }
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $({ $field:ident })? => $message:literal
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $({ $field: String })?,
            )*
        }

        impl $name {
            $(define_port_error!(@ctor $variant $($field)?);)*
        }
    };
}

pub(crate) use define_port_error;
