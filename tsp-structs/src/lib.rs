pub mod config;

/// Declares a serde struct whose every field carries a default value.
///
/// Missing fields fall back to the declared defaults when deserializing, so a
/// partial JSON document (or `{}`) is always accepted.
#[macro_export]
macro_rules! serializable_struct {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$attr:meta])* $field:ident : $type:ty = $default:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
        #[serde(default)]
        pub struct $name {
            $( $(#[$attr])* pub $field : $type, )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $( $field: $default, )*
                }
            }
        }
    };
}
