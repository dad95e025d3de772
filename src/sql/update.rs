//! Partial updates: only fields present in the request body are written.

use serde::{Deserialize, Deserializer};
use sqlx::postgres::PgArguments;

use super::args::{into_pg_arguments, SqlArg};
use crate::utils::error::{AppError, AppResult};

/// A request field that is either missing, explicitly `null`, or set.
///
/// Use with `#[serde(default)]` so that missing fields become `Absent`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Absent,
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[derive(Debug, Default)]
pub struct UpdateBuilder {
    assignments: Vec<String>,
    args: Vec<SqlArg>,
}

impl UpdateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn bind(&mut self, arg: SqlArg) -> usize {
        self.args.push(arg);
        self.args.len()
    }

    /// `column = $n`, binding a typed NULL for `Patch::Null`.
    pub fn set<T>(&mut self, column: &str, patch: Patch<T>) -> &mut Self
    where
        Option<T>: Into<SqlArg>,
    {
        let arg = match patch {
            Patch::Absent => return self,
            Patch::Null => None::<T>.into(),
            Patch::Value(v) => Some(v).into(),
        };
        let index = self.bind(arg);
        self.assignments.push(format!("{} = ${}", column, index));
        self
    }

    /// Like [`set`](Self::set) but trims, storing blank strings as NULL.
    pub fn set_text(&mut self, column: &str, patch: Patch<String>) -> &mut Self {
        let patch = match patch {
            Patch::Value(v) if v.trim().is_empty() => Patch::Null,
            Patch::Value(v) => Patch::Value(v.trim().to_string()),
            other => other,
        };
        self.set(column, patch)
    }

    /// Array columns are never NULL; `null` clears them.
    pub fn set_text_array(&mut self, column: &str, patch: Patch<Vec<String>>) -> &mut Self {
        let values = match patch {
            Patch::Absent => return self,
            Patch::Null => Vec::new(),
            Patch::Value(v) => v,
        };
        let index = self.bind(SqlArg::TextArray(values));
        self.assignments.push(format!("{} = ${}", column, index));
        self
    }

    /// Writes a WGS84 point from longitude and latitude. Both must be set
    /// together; a `null` in either clears the position.
    pub fn set_point(&mut self, column: &str, lon: Patch<f64>, lat: Patch<f64>) -> AppResult<&mut Self> {
        match (lon, lat) {
            (Patch::Absent, Patch::Absent) => {}
            (Patch::Null, _) | (_, Patch::Null) => {
                self.assignments.push(format!("{} = NULL", column));
            }
            (Patch::Value(lon), Patch::Value(lat)) => {
                if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
                    return Err(AppError::validation("lon/lat out of range"));
                }
                let lon_index = self.bind(SqlArg::from(lon));
                let lat_index = self.bind(SqlArg::from(lat));
                self.assignments.push(format!(
                    "{} = ST_SetSRID(ST_MakePoint(${}, ${}), 4326)",
                    column, lon_index, lat_index
                ));
            }
            _ => return Err(AppError::validation("lon and lat must be provided together")),
        }
        Ok(self)
    }

    /// `UPDATE table SET ... , modified_at = NOW() WHERE id_column = $n`, or
    /// `None` when nothing was set.
    pub fn build(mut self, table: &str, id_column: &str, id: i32) -> Option<(String, PgArguments)> {
        if self.assignments.is_empty() {
            return None;
        }
        let id_index = self.bind(SqlArg::from(id));
        let sql = format!(
            "UPDATE {} SET {}, modified_at = NOW() WHERE {} = ${}",
            table,
            self.assignments.join(", "),
            id_column,
            id_index
        );
        Some((sql, into_pg_arguments(self.args)))
    }

    #[cfg(test)]
    fn parts(&self) -> (&[String], &[SqlArg]) {
        (&self.assignments, &self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Default)]
    struct Body {
        #[serde(default)]
        name: Patch<String>,
        #[serde(default)]
        capacity: Patch<i32>,
        #[serde(default)]
        tags: Patch<Vec<String>>,
    }

    #[test]
    fn test_patch_distinguishes_missing_and_null() {
        let body: Body = serde_json::from_str(r#"{"name": null, "capacity": 40}"#).unwrap();
        assert_eq!(body.name, Patch::Null);
        assert_eq!(body.capacity, Patch::Value(40));
        assert!(body.tags.is_absent());
    }

    #[test]
    fn test_builder_only_writes_present_fields() {
        let body: Body =
            serde_json::from_str(r#"{"name": "  Saal 2 ", "tags": null}"#).unwrap();
        let mut b = UpdateBuilder::new();
        b.set_text("name", body.name)
            .set("total_capacity", body.capacity)
            .set_text_array("tags", body.tags);

        let (sets, args) = b.parts();
        assert_eq!(sets, &["name = $1".to_string(), "tags = $2".to_string()]);
        assert_eq!(
            args,
            &[SqlArg::from("Saal 2"), SqlArg::TextArray(Vec::new())]
        );

        let (sql, _) = b.build("space", "id", 9).unwrap();
        assert_eq!(
            sql,
            "UPDATE space SET name = $1, tags = $2, modified_at = NOW() WHERE id = $3"
        );
    }

    #[test]
    fn test_blank_text_becomes_null() {
        let mut b = UpdateBuilder::new();
        b.set_text("subtitle", Patch::Value("   ".to_string()));
        assert_eq!(b.parts().1, &[SqlArg::Text(None)]);
    }

    #[test]
    fn test_empty_builder_builds_nothing() {
        let mut b = UpdateBuilder::new();
        b.set::<i32>("min_age", Patch::Absent);
        assert!(b.is_empty());
        assert!(b.build("event", "id", 1).is_none());
    }

    #[test]
    fn test_set_point() {
        let mut b = UpdateBuilder::new();
        b.set_point("wkb_pos", Patch::Value(9.43), Patch::Value(54.78))
            .unwrap();
        assert_eq!(
            b.parts().0,
            &["wkb_pos = ST_SetSRID(ST_MakePoint($1, $2), 4326)".to_string()]
        );

        let mut b = UpdateBuilder::new();
        b.set_point("wkb_pos", Patch::Null, Patch::Absent).unwrap();
        assert_eq!(b.parts().0, &["wkb_pos = NULL".to_string()]);

        let mut b = UpdateBuilder::new();
        assert!(b.set_point("wkb_pos", Patch::Value(9.0), Patch::Absent).is_err());
        assert!(b.set_point("wkb_pos", Patch::Value(200.0), Patch::Value(1.0)).is_err());
    }
}
