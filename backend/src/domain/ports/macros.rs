//! Defines helper macros for generating domain port error enums.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

/// Implement `From<$error> for Error` for a repository error enum sharing the
/// standard `Connection`/`Query`/`NotFound`/`Conflict` variants.
///
/// Rejections carry a stable `code` surfaced in the error details.
macro_rules! impl_repository_error_conversion {
    ($error:ident) => {
        impl From<$error> for $crate::domain::Error {
            fn from(value: $error) -> Self {
                match value {
                    $error::Connection { message } => {
                        $crate::domain::Error::service_unavailable(message)
                    }
                    $error::Query { message } => $crate::domain::Error::internal(message),
                    $error::NotFound { code, message } => $crate::domain::Error::not_found(message)
                        .with_details(::serde_json::json!({ "code": code })),
                    $error::Conflict { code, message } => $crate::domain::Error::conflict(message)
                        .with_details(::serde_json::json!({ "code": code })),
                }
            }
        }
    };
}

pub(crate) use impl_repository_error_conversion;
