use std::fmt;

/// Slot operator carried by a slot requirement
///
/// See [PMS 8.3.3](https://projects.gentoo.org/pms/latest/pms.html#slot-dependencies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotOperator {
    /// `:=`: rebuild when the slot or sub-slot changes.
    Equal,
    /// `:*`: any slot, no rebuild.
    Star,
}

impl fmt::Display for SlotOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            SlotOperator::Equal => "=",
            SlotOperator::Star => "*",
        })
    }
}

/// Slot name and optional sub-slot, e.g. `0` or `0/1.2`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub slot: String,
    pub subslot: Option<String>,
}

impl Slot {
    pub fn new(slot: impl Into<String>) -> Self {
        Slot {
            slot: slot.into(),
            subslot: None,
        }
    }

    pub fn with_subslot(slot: impl Into<String>, subslot: impl Into<String>) -> Self {
        Slot {
            slot: slot.into(),
            subslot: Some(subslot.into()),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.subslot {
            Some(subslot) => write!(f, "{}/{}", self.slot, subslot),
            None => f.write_str(&self.slot),
        }
    }
}

/// The slot part of a dependency specifier (everything after the `:`)
///
/// Only a named slot constrains matching; a bare `:=` or `:*` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotDep {
    /// `:0`, `:0/1.2`, `:0=`
    Named {
        slot: Slot,
        op: Option<SlotOperator>,
    },
    /// `:=` or `:*`
    Operator(SlotOperator),
}

impl SlotDep {
    /// The named slot this requirement pins, if any.
    pub fn slot(&self) -> Option<&Slot> {
        match self {
            SlotDep::Named { slot, .. } => Some(slot),
            SlotDep::Operator(_) => None,
        }
    }

    pub fn operator(&self) -> Option<SlotOperator> {
        match self {
            SlotDep::Named { op, .. } => *op,
            SlotDep::Operator(op) => Some(*op),
        }
    }
}

impl fmt::Display for SlotDep {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SlotDep::Named { slot, op } => {
                write!(f, "{}", slot)?;
                if let Some(op) = op {
                    write!(f, "{}", op)?;
                }
                Ok(())
            }
            SlotDep::Operator(op) => write!(f, "{}", op),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_display() {
        assert_eq!(Slot::new("0").to_string(), "0");
        assert_eq!(Slot::with_subslot("0", "1.2").to_string(), "0/1.2");
    }

    #[test]
    fn test_slot_dep_accessors() {
        let named = SlotDep::Named {
            slot: Slot::with_subslot("0", "1"),
            op: Some(SlotOperator::Equal),
        };
        assert_eq!(named.slot().map(|s| s.to_string()), Some("0/1".to_string()));
        assert_eq!(named.operator(), Some(SlotOperator::Equal));
        assert_eq!(named.to_string(), "0/1=");

        let bare = SlotDep::Operator(SlotOperator::Star);
        assert!(bare.slot().is_none());
        assert_eq!(bare.to_string(), "*");
    }
}
