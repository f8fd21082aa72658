//! Typed query-string binding.
//!
//! A target type spells out how it is read from the query string by
//! implementing [`FromQuery`]. There is no runtime inspection of the target:
//! a type that does not implement the trait cannot be bound.
//!
//! ```rust
//! use auxi::query::{FromQuery, Query, QueryError};
//!
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl FromQuery for Person {
//!     fn from_query(query: &Query) -> Result<Self, QueryError> {
//!         let mut problems = QueryError::default();
//!         let name = problems.check(query.required("name"));
//!         let age = problems.check(query.parsed("age"));
//!         problems.into_result()?;
//!         Ok(Person { name: name.unwrap_or_default().to_owned(), age: age.unwrap_or_default() })
//!     }
//! }
//!
//! let person = Person::from_query(&Query::parse("name=ann&age=41")).unwrap();
//! assert_eq!(person.age, 41);
//! ```

use std::collections::HashMap;
use std::str::FromStr;

use crate::envelope::{ErrorResponse, Validation};

/// A parsed query string: percent-decoded, first value per key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    values: HashMap<String, String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        let mut values = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            values.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The value of `key`; missing and empty are both an error.
    pub fn required(&self, key: &str) -> Result<&str, Validation> {
        match self.get(key) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(Validation::new(key, format!("query string missing field '{key}'"))),
        }
    }

    /// The value of `key` parsed as `T`.
    pub fn parsed<T: FromStr>(&self, key: &str) -> Result<T, Validation> {
        self.required(key)?.parse().map_err(|_| {
            Validation::new(key, format!("query string field '{key}' has an invalid value"))
        })
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

/// Decodes a value from a [`Query`].
pub trait FromQuery: Sized {
    fn from_query(query: &Query) -> Result<Self, QueryError>;
}

impl FromQuery for Query {
    fn from_query(query: &Query) -> Result<Self, QueryError> {
        Ok(query.clone())
    }
}

/// Every field that failed to bind, in the order they were checked.
#[derive(Clone, Debug, Default, PartialEq, Eq, thiserror::Error)]
#[error("query string is invalid ({} field(s))", .problems.len())]
pub struct QueryError {
    problems: Vec<Validation>,
}

impl QueryError {
    /// Records a failed field and passes a successful one through.
    pub fn check<T>(&mut self, field: Result<T, Validation>) -> Option<T> {
        match field {
            Ok(v) => Some(v),
            Err(problem) => {
                self.problems.push(problem);
                None
            }
        }
    }

    /// `Err(self)` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.problems.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn problems(&self) -> &[Validation] {
        &self.problems
    }
}

impl From<Validation> for QueryError {
    fn from(problem: Validation) -> Self {
        Self { problems: vec![problem] }
    }
}

impl From<QueryError> for ErrorResponse {
    fn from(err: QueryError) -> Self {
        let mut res = ErrorResponse::new("Query string is invalid");
        res.error.validation_errors = err.problems;
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Filter {
        city: String,
        limit: Option<u16>,
    }

    impl FromQuery for Filter {
        fn from_query(query: &Query) -> Result<Self, QueryError> {
            let city = query.required("city")?.to_owned();
            let limit = match query.get("limit") {
                Some(_) => Some(query.parsed("limit")?),
                None => None,
            };
            Ok(Filter { city, limit })
        }
    }

    #[test]
    fn binds_present_fields() {
        let filter = Filter::from_query(&Query::parse("city=Oslo&limit=5")).unwrap();
        assert_eq!(filter.city, "Oslo");
        assert_eq!(filter.limit, Some(5));
    }

    #[test]
    fn optional_field_may_be_absent() {
        let filter = Filter::from_query(&Query::parse("city=Oslo")).unwrap();
        assert_eq!(filter.limit, None);
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        let Err(err) = Filter::from_query(&Query::parse("limit=5")) else {
            panic!("expected an error");
        };
        assert_eq!(err.problems()[0].field, "city");
    }

    #[test]
    fn accumulates_every_problem() {
        let query = Query::parse("age=old");
        let mut problems = QueryError::default();
        problems.check(query.required("name"));
        problems.check(query.parsed::<u8>("age"));

        let envelope = ErrorResponse::from(problems.into_result().unwrap_err());
        let fields: Vec<_> = envelope.validations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, ["name", "age"]);
    }

    #[test]
    fn empty_value_counts_as_missing() {
        assert!(Query::parse("name=").required("name").is_err());
    }
}
