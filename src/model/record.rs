use crate::errors::{Error, Result};
use crate::reflect::{Instance, Reflect};
use indexmap::IndexMap;
use std::any::{type_name, Any};
use std::fmt;

/// Decoded member values of a class, produced by the property-from-XML
/// pipeline and consumed by model constructors.
///
/// A member may be recorded as absent, which is the case for optional
/// members without matching XML elements.
#[derive(Default)]
pub struct PropertiesRecord {
    values: IndexMap<&'static str, Option<Instance>>,
}

impl PropertiesRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the value of a member. A member recorded again keeps its
    /// position and gets the new value.
    pub fn insert(&mut self, name: &'static str, value: Option<Instance>) {
        self.values.insert(name, value);
    }

    /// Returns `true` if the member is recorded, even as absent.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over recorded member names in recording order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    /// Returns the count of recorded members.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes a member, returning its recorded value.
    pub fn remove(&mut self, name: &str) -> Option<Option<Instance>> {
        self.values.shift_remove(name)
    }

    /// Borrows the value of a member. Returns `None` if the member is recorded
    /// as absent.
    pub fn get<T: Any>(&self, name: &str) -> Result<Option<&T>> {
        match self.values.get(name) {
            None => Err(Error::MissingProperty(name.to_owned())),
            Some(None) => Ok(None),
            Some(Some(value)) => match value.downcast_ref::<T>() {
                Some(value) => Ok(Some(value)),
                None => Err(unexpected::<T>(name)),
            },
        }
    }

    /// Moves the value of a member out of the record.
    ///
    /// A member recorded as absent can be taken only as an `Option`.
    ///
    /// ```
    /// # use pretty_assertions::assert_eq;
    /// use xml_model::PropertiesRecord;
    ///
    /// let mut record = PropertiesRecord::new();
    /// record.insert("name", Some(Box::new("Dune".to_string())));
    /// record.insert("isbn", None);
    ///
    /// assert_eq!(record.take::<String>("name").unwrap(), "Dune");
    /// assert_eq!(record.take::<Option<String>>("isbn").unwrap(), None);
    /// assert!(record.take::<String>("name").is_err());
    /// ```
    pub fn take<T: Reflect>(&mut self, name: &str) -> Result<T> {
        match self.values.shift_remove(name) {
            None => Err(Error::MissingProperty(name.to_owned())),
            Some(None) => T::absent().ok_or_else(|| Error::MissingProperty(name.to_owned())),
            Some(Some(value)) => T::from_instance(value).map_err(|_| unexpected::<T>(name)),
        }
    }

    /// Moves the value of a member out of the record. Unrecorded and absent
    /// members are both `None`.
    pub fn take_optional<T: Reflect>(&mut self, name: &str) -> Result<Option<T>> {
        match self.values.shift_remove(name) {
            None | Some(None) => Ok(None),
            Some(Some(value)) => T::from_instance(value)
                .map(Some)
                .map_err(|_| unexpected::<T>(name)),
        }
    }
}

fn unexpected<T>(name: &str) -> Error {
    Error::UnexpectedType {
        property: name.to_owned(),
        expected: type_name::<T>(),
    }
}

impl fmt::Debug for PropertiesRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.values
                    .iter()
                    .map(|(name, value)| (name, if value.is_some() { "<value>" } else { "<absent>" })),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> PropertiesRecord {
        let mut record = PropertiesRecord::new();
        record.insert("name", Some(Box::new("test".to_string())));
        record.insert("pages", Some(Box::new(10.0_f64)));
        record.insert("isbn", None);
        record
    }

    #[test]
    fn override_keeps_position() {
        let mut record = record();
        record.insert("name", Some(Box::new("other".to_string())));
        assert_eq!(record.names().collect::<Vec<_>>(), ["name", "pages", "isbn"]);
        assert_eq!(record.get::<String>("name").unwrap().unwrap(), "other");
    }

    #[test]
    fn take() {
        let mut record = record();
        assert_eq!(record.take::<f64>("pages").unwrap(), 10.0);
        assert!(!record.contains("pages"));
        assert_eq!(record.take_optional::<String>("isbn").unwrap(), None);
        assert_eq!(record.take_optional::<String>("unknown").unwrap(), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn errors() {
        let mut record = record();
        assert!(matches!(
            record.get::<u8>("pages"),
            Err(Error::UnexpectedType { property, .. }) if property == "pages"
        ));
        assert!(matches!(
            record.take::<String>("isbn"),
            Err(Error::MissingProperty(name)) if name == "isbn"
        ));
        assert!(matches!(
            record.take::<bool>("missing"),
            Err(Error::MissingProperty(_))
        ));
        assert!(matches!(
            record.take::<bool>("name"),
            Err(Error::UnexpectedType { .. })
        ));
    }
}
