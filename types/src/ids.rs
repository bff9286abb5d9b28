use std::fmt;

/// Declares an opaque string identifier.
///
/// Identifiers are assigned by the factories (or by the persistence layer for
/// loaded records) and serialize as bare strings so records round-trip
/// field-for-field.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a risk-assessment mission.
    MissionId
);
string_id!(
    /// Identifier of one workshop instance of a mission.
    WorkshopId
);
string_id!(BusinessValueId);
string_id!(DreadedEventId);
string_id!(AttackPathId);
string_id!(BaselineId);
string_id!(MeasureId);
string_id!(BaselineGapId);
string_id!(
    /// User assigned to a mission; owned by the authentication layer.
    UserId
);
string_id!(
    /// Identifier of a methodology step within a workshop (e.g. `"business-values"`).
    StepId
);
