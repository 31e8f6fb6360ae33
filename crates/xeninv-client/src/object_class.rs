//! Closed enumeration of fetchable object classes

use std::fmt;

/// Object classes this client fetches from the XenServer API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// Virtual machines
    Vm,
    /// Physical hosts
    Host,
    /// Resource pools
    Pool,
}

impl ObjectClass {
    /// All fetchable classes
    pub const ALL: [ObjectClass; 3] = [ObjectClass::Vm, ObjectClass::Host, ObjectClass::Pool];

    /// Class name as it appears in XenAPI method names
    #[must_use]
    pub fn api_name(self) -> &'static str {
        match self {
            ObjectClass::Vm => "VM",
            ObjectClass::Host => "host",
            ObjectClass::Pool => "pool",
        }
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_names() {
        assert_eq!(ObjectClass::Vm.api_name(), "VM");
        assert_eq!(ObjectClass::Host.api_name(), "host");
        assert_eq!(ObjectClass::Pool.api_name(), "pool");
    }

    #[test]
    fn test_display_matches_api_name() {
        for class in ObjectClass::ALL {
            assert_eq!(class.to_string(), class.api_name());
        }
    }
}
