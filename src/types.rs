use serde::{Deserialize, Serialize};

/// Shape of a value flowing through a specification.
///
/// Equality is structural: tags must match and element/key/value types
/// must be equal recursively. This is the only operand-compatibility rule
/// for arithmetic and membership.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Scalar,
    Matrix,
    Sequence(Box<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
}

impl ValueType {
    pub fn sequence(elem: ValueType) -> Self {
        ValueType::Sequence(Box::new(elem))
    }

    pub fn map(key: ValueType, value: ValueType) -> Self {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ValueType::Sequence(_))
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, ValueType::Matrix)
    }

    /// Human-readable name, in the spec language's own spelling.
    pub fn display(&self) -> String {
        match self {
            ValueType::Scalar => "real".to_string(),
            ValueType::Matrix => "matrix".to_string(),
            ValueType::Sequence(elem) => format!("list of {}", elem.display()),
            ValueType::Map(k, v) => format!("map from {} to {}", k.display(), v.display()),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// Which random process a specification's accuracy clause quantifies over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    None,
    OverInputs,
    OverRuns,
    OverItems,
    PerformanceOnly,
    Conflict,
}

impl Domain {
    /// Combine the domains of two independent sub-expressions.
    ///
    /// `None` is the identity; equal domains stay; anything else conflicts.
    pub fn merge(self, other: Domain) -> Domain {
        match (self, other) {
            (Domain::None, d) | (d, Domain::None) => d,
            (a, b) if a == b => a,
            _ => Domain::Conflict,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::None => "none",
            Domain::OverInputs => "over inputs",
            Domain::OverRuns => "over runs",
            Domain::OverItems => "over items",
            Domain::PerformanceOnly => "performance only",
            Domain::Conflict => "conflict",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Domain; 6] = [
        Domain::None,
        Domain::OverInputs,
        Domain::OverRuns,
        Domain::OverItems,
        Domain::PerformanceOnly,
        Domain::Conflict,
    ];

    #[test]
    fn test_structural_equality() {
        let seq = ValueType::sequence(ValueType::Scalar);
        assert_eq!(seq, ValueType::sequence(ValueType::Scalar));
        assert_ne!(seq, ValueType::map(ValueType::Scalar, ValueType::Scalar));
        assert_ne!(ValueType::sequence(seq.clone()), seq);
        assert_ne!(ValueType::Matrix, ValueType::Scalar);
    }

    #[test]
    fn test_structural_equality_is_symmetric() {
        let shapes = [
            ValueType::Scalar,
            ValueType::Matrix,
            ValueType::sequence(ValueType::Scalar),
            ValueType::sequence(ValueType::Matrix),
            ValueType::map(ValueType::Scalar, ValueType::sequence(ValueType::Scalar)),
        ];
        for a in &shapes {
            assert_eq!(a, a);
            for b in &shapes {
                assert_eq!(a == b, b == a);
            }
        }
    }

    #[test]
    fn test_merge_none_is_identity() {
        for d in ALL {
            assert_eq!(Domain::None.merge(d), d);
            assert_eq!(d.merge(Domain::None), d);
        }
    }

    #[test]
    fn test_merge_is_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.merge(b), b.merge(a), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_merge_equal_and_distinct() {
        assert_eq!(Domain::OverRuns.merge(Domain::OverRuns), Domain::OverRuns);
        assert_eq!(Domain::OverRuns.merge(Domain::OverItems), Domain::Conflict);
        assert_eq!(Domain::OverInputs.merge(Domain::Conflict), Domain::Conflict);
    }

    #[test]
    fn test_display_spelling() {
        let t = ValueType::map(ValueType::Scalar, ValueType::sequence(ValueType::Scalar));
        assert_eq!(t.display(), "map from real to list of real");
    }
}
