/// Defines a newtype ID wrapper around an opaque string identifier
/// and generates:
/// - derives (Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)
/// - transparent serde representation (the JSON form is the bare string)
/// - `Display` and `AsRef<str>`
/// - `From<String>`, `From<&str>` and `From<$name> for String`
///
/// Usage:
///   define_id_type!(SubjectId);
#[macro_export]
macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl ::std::convert::From<String> for $name {
            fn from(v: String) -> Self {
                $name(v)
            }
        }

        impl ::std::convert::From<&str> for $name {
            fn from(v: &str) -> Self {
                $name(v.to_string())
            }
        }

        impl ::std::convert::From<$name> for String {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                $name(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

#[cfg(test)]
mod tests {
    define_id_type!(SampleId);

    #[test]
    fn test_id_serializes_as_bare_string() {
        let id = SampleId::new("abc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc-1\"");
        let parsed: SampleId = serde_json::from_str("\"abc-1\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_id_conversions() {
        let id: SampleId = "42".into();
        assert_eq!(id.as_str(), "42");
        assert_eq!(id.to_string(), "42");
        let raw: String = id.into();
        assert_eq!(raw, "42");
    }
}
