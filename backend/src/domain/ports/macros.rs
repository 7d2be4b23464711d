//! Generates port error enums together with `impl Into` constructors.
//!
//! Every variant carries named fields. For a variant `Unavailable { message:
//! String }` the macro emits `fn unavailable(message: impl Into<String>)`.

macro_rules! define_port_error {
    (@ctor $variant:ident ($($params:tt)*) ($($inits:tt)*)) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor
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

        impl $name {
            $(
                define_port_error!(@ctor $variant () () $($field : $ty,)*);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation.
    define_port_error! {
        pub enum CachePortError {
            Timeout { after_ms: u64 } => "cache timed out after {after_ms}ms",
            Refused { host: String, port: u16 } => "cache refused {host}:{port}",
        }
    }

    #[test]
    fn constructors_keep_numeric_fields() {
        let err = CachePortError::timeout(250_u64);
        assert_eq!(err.to_string(), "cache timed out after 250ms");
    }

    #[test]
    fn constructors_convert_str_into_string() {
        let err = CachePortError::refused("redis", 6379_u16);
        assert_eq!(
            err,
            CachePortError::Refused {
                host: "redis".to_owned(),
                port: 6379,
            }
        );
    }
}
