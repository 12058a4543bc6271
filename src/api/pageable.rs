use crate::api::error::RestError;
use crate::entities::resources;
use sea_orm::Order;
use std::collections::HashMap;

pub const DEFAULT_PAGE_SIZE: u64 = 25;
pub const MAX_PAGE_SIZE: u64 = 50;

/// Sortable resource attributes. Anything else in the `sort` parameter
/// falls back to the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Id,
    Created,
}

impl SortField {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(SortField::Name),
            "id" => Some(SortField::Id),
            "created" => Some(SortField::Created),
            _ => None,
        }
    }

    pub fn column(&self) -> resources::Column {
        match self {
            SortField::Name => resources::Column::Name,
            SortField::Id => resources::Column::Id,
            SortField::Created => resources::Column::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn order(&self) -> Order {
        match self {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        }
    }
}

/// Pagination request parsed from the query string. Defaults to the first
/// page of 25 rows sorted by name descending; the hard cap of 50 is checked
/// by the handler before the store is consulted.
#[derive(Debug, Clone)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
    pub sort: SortField,
    pub dir: SortDir,
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: SortField::Name,
            dir: SortDir::Desc,
        }
    }
}

impl Pageable {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let default = Self::default();

        let page = params
            .get("page")
            .and_then(|v| v.parse().ok())
            .unwrap_or(default.page);
        // A zero size would make the paginator divide by zero.
        let size = params
            .get("size")
            .and_then(|v| v.parse().ok())
            .filter(|s| *s > 0)
            .unwrap_or(default.size);
        let sort = params
            .get("sort")
            .and_then(|v| SortField::parse(v))
            .unwrap_or(default.sort);
        let dir = params
            .get("dir")
            .map(|v| {
                if v.eq_ignore_ascii_case("asc") {
                    SortDir::Asc
                } else {
                    SortDir::Desc
                }
            })
            .unwrap_or(default.dir);

        Self {
            page,
            size,
            sort,
            dir,
        }
    }

    /// Fails with `PAGE_SIZE_TOO_LARGE` when the caller asks for more rows
    /// than the cap allows.
    pub fn ensure_within_cap(&self) -> Result<(), RestError> {
        if self.size > MAX_PAGE_SIZE {
            return Err(RestError::page_size_too_large(self.size, MAX_PAGE_SIZE));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let pageable = Pageable::from_params(&HashMap::new());
        assert_eq!(pageable.page, 0);
        assert_eq!(pageable.size, DEFAULT_PAGE_SIZE);
        assert_eq!(pageable.sort, SortField::Name);
        assert_eq!(pageable.dir, SortDir::Desc);
    }

    #[test]
    fn test_explicit_values() {
        let pageable =
            Pageable::from_params(&params(&[("page", "2"), ("size", "10"), ("dir", "asc")]));
        assert_eq!(pageable.page, 2);
        assert_eq!(pageable.size, 10);
        assert_eq!(pageable.dir, SortDir::Asc);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let pageable =
            Pageable::from_params(&params(&[("page", "x"), ("size", "0"), ("sort", "owner")]));
        assert_eq!(pageable.page, 0);
        assert_eq!(pageable.size, DEFAULT_PAGE_SIZE);
        assert_eq!(pageable.sort, SortField::Name);
    }

    #[test]
    fn test_cap_enforced() {
        let pageable = Pageable::from_params(&params(&[("size", "51")]));
        assert!(pageable.ensure_within_cap().is_err());

        let pageable = Pageable::from_params(&params(&[("size", "50")]));
        assert!(pageable.ensure_within_cap().is_ok());
    }
}
