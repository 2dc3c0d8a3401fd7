//! Helper macro for declaring port error enums.

/// Declare a port error enum with struct variants and snake_case
/// constructors whose parameters accept `impl Into<FieldType>`.
macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        ::paste::paste! {
            impl $name {
                $(
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                        Self::$variant { $($field: $field.into()),* }
                    }
                )*
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Connection { message: String } => "connection failed: {message}",
            Timeout { seconds: u64 } => "timed out after {seconds}s",
        }
    }

    #[test]
    fn constructors_convert_into_field_types() {
        let err = SamplePortError::connection("refused");
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = SamplePortError::timeout(30_u64);
        assert_eq!(err.to_string(), "timed out after 30s");
    }
}
