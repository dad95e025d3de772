//! WHERE-clause assembly for the filterable list endpoints.
//!
//! Every builder takes raw query-string input, does nothing when the input is
//! blank, and otherwise appends one condition plus its bound arguments.
//! Placeholder numbers follow the count of arguments bound so far, so builders
//! can be called in any order as long as the arguments are bound in the same
//! order they were pushed.

use sqlx::postgres::PgArguments;
use thiserror::Error;

use super::args::{into_pg_arguments, SqlArg};

/// Upper bound used when an age column is NULL.
pub const OPEN_RANGE_MAX: i32 = 1000;

const MAX_FLAG_BIT: i64 = 62;
const MAX_PATTERN_WILDCARDS: usize = 2;
const ASTERISK_PLACEHOLDER: &str = "\u{0}ASTERISK\u{0}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FilterError(pub String);

impl FilterError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, Default, Clone)]
pub struct QueryFilter {
    conditions: Vec<String>,
    args: Vec<SqlArg>,
    reserved: usize,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A filter whose first placeholder is `$reserved + 1`, leaving the lower
    /// numbers to static arguments of the surrounding query.
    pub fn starting_after(reserved: usize) -> Self {
        Self {
            reserved,
            ..Self::default()
        }
    }

    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    pub fn args(&self) -> &[SqlArg] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Number of the next placeholder to be handed out.
    pub fn next_index(&self) -> usize {
        self.reserved + self.args.len() + 1
    }

    fn bind(&mut self, arg: impl Into<SqlArg>) -> usize {
        let index = self.next_index();
        self.args.push(arg.into());
        index
    }

    /// Adds a condition without arguments.
    pub fn push_condition(&mut self, condition: impl Into<String>) -> &mut Self {
        self.conditions.push(condition.into());
        self
    }

    /// Adds a condition whose `{}` is replaced by the placeholder of `arg`.
    pub fn push(&mut self, template: &str, arg: impl Into<SqlArg>) -> &mut Self {
        let index = self.bind(arg);
        self.conditions
            .push(template.replacen("{}", &format!("${}", index), 1));
        self
    }

    /// `WHERE c1 AND c2 ...`, or an empty string without conditions.
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// ` AND c1 AND c2 ...` for queries that already have a WHERE clause.
    pub fn and_clause(&self) -> String {
        self.conditions
            .iter()
            .map(|c| format!(" AND {}", c))
            .collect()
    }

    pub fn into_arguments(self) -> PgArguments {
        into_pg_arguments(self.args)
    }

    /// Case-insensitive pattern match using the sanitized input as the pattern.
    pub fn ilike(&mut self, input: &str, column: &str, label: &str) -> FilterResult<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let pattern = sanitize_search_pattern(input)
            .map_err(|_| FilterError::new(format!("{} format error: {}", label, input)))?;
        let index = self.bind(pattern);
        self.conditions
            .push(format!("{} ILIKE ${}", column, index));
        Ok(())
    }

    /// Substring search against a pre-normalized text column.
    pub fn search(&mut self, input: &str, column: &str, label: &str) -> FilterResult<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let sanitized = sanitize_search_pattern(input)
            .map_err(|_| FilterError::new(format!("{} format error: {}", label, input)))?;
        let index = self.bind(normalize_german(&sanitized));
        self.conditions
            .push(format!("{} ILIKE '%' || ${} || '%'", column, index));
        Ok(())
    }

    /// Matches rows having every listed flag bit set.
    pub fn bitmask(&mut self, input: &str, column: &str, label: &str) -> FilterResult<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let mut mask: i64 = 0;
        for part in input.split(',') {
            let flag_str = part.trim();
            let flag: i64 = flag_str
                .parse()
                .map_err(|_| FilterError::new(format!("{} format error: {}", label, flag_str)))?;
            if !(0..=MAX_FLAG_BIT).contains(&flag) {
                return Err(FilterError::new(format!(
                    "{} contains out-of-range flag: {}",
                    label, flag
                )));
            }
            mask |= 1 << flag;
        }
        let index = self.bind(mask);
        self.conditions
            .push(format!("({} & ${}) = ${}", column, index, index));
        Ok(())
    }

    pub fn int_range(&mut self, min: &str, max: &str, column: &str) -> FilterResult<()> {
        let min = min.trim();
        let max = max.trim();
        match (min.is_empty(), max.is_empty()) {
            (true, true) => {}
            (false, false) => {
                let min_val = parse_int(min).map_err(|_| invalid("min value", min))?;
                let max_val = parse_int(max).map_err(|_| invalid("max value", max))?;
                let lo = self.bind(min_val);
                let hi = self.bind(max_val);
                self.conditions
                    .push(format!("({} BETWEEN ${} AND ${})", column, lo, hi));
            }
            (false, true) => {
                let min_val = parse_int(min).map_err(|_| invalid("min value", min))?;
                let index = self.bind(min_val);
                self.conditions.push(format!("({} >= ${})", column, index));
            }
            (true, false) => {
                let max_val = parse_int(max).map_err(|_| invalid("max value", max))?;
                let index = self.bind(max_val);
                self.conditions.push(format!("({} <= ${})", column, index));
            }
        }
        Ok(())
    }

    /// One value must lie inside `[min_col, max_col]`; two values form a range
    /// that must be covered by it. NULL bounds are open.
    pub fn contained_in_column_range(
        &mut self,
        input: &str,
        min_col: &str,
        max_col: &str,
    ) -> FilterResult<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        let min_expr = format!("COALESCE({}, 0)", min_col);
        let max_expr = format!("COALESCE({}, {})", max_col, OPEN_RANGE_MAX);

        match parts.as_slice() {
            [single] => {
                let value = parse_int(single).map_err(|_| invalid("integer value", single))?;
                let index = self.bind(value);
                self.conditions.push(format!(
                    "(${} BETWEEN {} AND {})",
                    index, min_expr, max_expr
                ));
            }
            [first, second] => {
                let lo = parse_int(first).map_err(|_| invalid("integer value", first))?;
                let hi = parse_int(second).map_err(|_| invalid("integer value", second))?;
                let lo_index = self.bind(lo);
                let hi_index = self.bind(hi);
                self.conditions.push(format!(
                    "({} <= ${} AND {} >= ${})",
                    min_expr, lo_index, max_expr, hi_index
                ));
            }
            _ => {
                return Err(FilterError::new(format!(
                    "invalid input: expected one or two integers, got: {}",
                    input
                )))
            }
        }
        Ok(())
    }

    /// `(expr = ANY($n))` with the listed ids bound as one INT4 array.
    pub fn column_in_ints(&mut self, input: &str, expr: &str, label: &str) -> FilterResult<()> {
        self.ints_with_format(input, &format!("({} = ANY({{}}))", expr), label)
    }

    /// Binds the listed integers as one array and substitutes its placeholder
    /// for the `{}` in `template`.
    pub fn ints_with_format(&mut self, input: &str, template: &str, label: &str) -> FilterResult<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let ids = parse_int_list(input).map_err(|bad| {
            FilterError::new(format!("{} {} is invalid", label, bad))
        })?;
        if ids.is_empty() {
            return Ok(());
        }
        self.push(template, ids);
        Ok(())
    }

    /// Binds the non-blank items of a comma list as one TEXT array and
    /// substitutes its placeholder for the `{}` in `template`.
    pub fn strings_with_format(&mut self, input: &str, template: &str, _label: &str) -> FilterResult<()> {
        let values = split_non_blank(input);
        if values.is_empty() {
            return Ok(());
        }
        self.push(template, values);
        Ok(())
    }

    /// Time-of-day window such as `9,1730` applied to a timestamp column.
    pub fn time_of_day(&mut self, input: &str, column: &str, label: &str) -> FilterResult<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let parts: Vec<&str> = input.split(',').collect();
        let [start, end] = parts.as_slice() else {
            return Err(FilterError::new(format!(
                "{} must have exactly two times separated by a comma: {}",
                label, input
            )));
        };
        let start = parse_flexible_time(start)
            .map_err(|e| FilterError::new(format!("{} start time is invalid: {}", label, e)))?;
        let end = parse_flexible_time(end)
            .map_err(|e| FilterError::new(format!("{} end time is invalid: {}", label, e)))?;

        let lo = self.bind(start);
        let hi = self.bind(end);
        self.conditions.push(format!(
            "TO_CHAR({}, 'HH24:MI') BETWEEN ${} AND ${}",
            column, lo, hi
        ));
        Ok(())
    }

    /// OR-combined ILIKE over a comma list; `*` acts as wildcard.
    pub fn like_any(&mut self, input: &str, column: &str) -> FilterResult<()> {
        let patterns = split_non_blank(input);
        if patterns.is_empty() {
            return Ok(());
        }
        let clauses: Vec<String> = patterns
            .into_iter()
            .map(|p| {
                let index = self.bind(p.replace('*', "%"));
                format!("{} ILIKE ${}", column, index)
            })
            .collect();
        self.conditions.push(format!("({})", clauses.join(" OR ")));
        Ok(())
    }

    /// PostGIS distance filter; applies only when all three values are given.
    pub fn geo_radius(&mut self, lon: &str, lat: &str, radius: &str, column: &str) -> FilterResult<()> {
        let (lon, lat, radius) = (lon.trim(), lat.trim(), radius.trim());
        if lon.is_empty() || lat.is_empty() || radius.is_empty() {
            return Ok(());
        }
        let lon_val = parse_float(lon)
            .filter(|v| (-180.0..=180.0).contains(v))
            .ok_or_else(|| FilterError::new(format!("lon '{}' is invalid", lon)))?;
        let lat_val = parse_float(lat)
            .filter(|v| (-90.0..=90.0).contains(v))
            .ok_or_else(|| FilterError::new(format!("lat '{}' is invalid", lat)))?;
        let radius_val = parse_float(radius)
            .filter(|v| *v >= 0.0)
            .ok_or_else(|| FilterError::new(format!("radius '{}' is invalid", radius)))?;

        let lon_index = self.bind(lon_val);
        let lat_index = self.bind(lat_val);
        let radius_index = self.bind(radius_val);
        self.conditions.push(format!(
            "ST_DWithin({}::geography, ST_SetSRID(ST_MakePoint(${}, ${}), 4326)::geography, ${})",
            column, lon_index, lat_index, radius_index
        ));
        Ok(())
    }

    /// Matches JSONB arrays of tuples whose element at `position` is one of the ids.
    pub fn json_array_ints(&mut self, input: &str, jsonb_column: &str, position: usize) -> FilterResult<()> {
        if input.trim().is_empty() {
            return Ok(());
        }
        let ids = parse_int_list(input)
            .map_err(|bad| FilterError::new(format!("invalid integer: {:?}", bad)))?;
        if ids.is_empty() {
            return Err(FilterError::new("no valid integers provided"));
        }
        let index = self.bind(ids);
        self.conditions.push(format!(
            "EXISTS (SELECT 1 FROM jsonb_array_elements({}) AS t(elem) WHERE (elem->>{})::int = ANY(${}))",
            jsonb_column, position, index
        ));
        Ok(())
    }

    /// TEXT[] column containing every listed value.
    pub fn array_contains(&mut self, input: &str, column: &str) -> FilterResult<()> {
        let values = split_non_blank(input);
        if values.is_empty() {
            return Ok(());
        }
        let index = self.bind(values);
        self.conditions
            .push(format!("{} @> ${}::text[]", column, index));
        Ok(())
    }

    /// Binds pagination arguments and returns the clause text. Call it after
    /// all conditions so the placeholders follow theirs.
    pub fn limit_offset(&mut self, limit: &str, offset: &str) -> FilterResult<String> {
        let mut clauses = Vec::new();
        let limit = limit.trim();
        if !limit.is_empty() {
            let value: i64 = limit
                .parse()
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| FilterError::new(format!("invalid limit: {}", limit)))?;
            let index = self.bind(value);
            clauses.push(format!("LIMIT ${}", index));
        }
        let offset = offset.trim();
        if !offset.is_empty() {
            let value: i64 = offset
                .parse()
                .ok()
                .filter(|v| *v >= 0)
                .ok_or_else(|| FilterError::new(format!("invalid offset: {}", offset)))?;
            let index = self.bind(value);
            clauses.push(format!("OFFSET ${}", index));
        }
        Ok(clauses.join(" "))
    }
}

/// Turns user wildcards into SQL ones: `*` becomes `%`, `\*` stays a literal
/// asterisk. Patterns ending up with more than two `%` are rejected.
pub fn sanitize_search_pattern(input: &str) -> FilterResult<String> {
    if input.is_empty() {
        return Ok(String::new());
    }
    let pattern = input
        .replace("\\*", ASTERISK_PLACEHOLDER)
        .replace('*', "%")
        .replace(ASTERISK_PLACEHOLDER, "*");

    if pattern.matches('%').count() > MAX_PATTERN_WILDCARDS {
        return Err(FilterError::new("too many wildcards in search pattern"));
    }
    Ok(pattern)
}

/// Lower-cases and folds German umlauts so input matches the stored search text.
pub fn normalize_german(input: &str) -> String {
    input
        .to_lowercase()
        .replace('ä', "ae")
        .replace('ö', "oe")
        .replace('ü', "ue")
        .replace('ß', "ss")
}

/// Accepts `H`, `HH` or `HHMM` and renders `HH:MM`.
fn parse_flexible_time(input: &str) -> FilterResult<String> {
    let s = input.trim();
    let parsed = match s.len() {
        1 | 2 => s.parse::<u32>().ok().filter(|h| *h < 24).map(|h| (h, 0)),
        4 if s.is_ascii() => {
            let hour = s[..2].parse::<u32>().ok();
            let minute = s[2..].parse::<u32>().ok();
            match (hour, minute) {
                (Some(h), Some(m)) if h < 24 && m < 60 => Some((h, m)),
                _ => None,
            }
        }
        _ => None,
    };
    parsed
        .map(|(h, m)| format!("{:02}:{:02}", h, m))
        .ok_or_else(|| FilterError::new(format!("invalid time format: {}", s)))
}

fn parse_int(s: &str) -> Result<i32, std::num::ParseIntError> {
    s.trim().parse()
}

fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers of a comma list, skipping blank items; the first bad item is returned as error.
pub fn parse_int_list(input: &str) -> Result<Vec<i32>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<i32>().map_err(|_| p.to_string()))
        .collect()
}

fn split_non_blank(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn invalid(what: &str, value: &str) -> FilterError {
    FilterError::new(format!("invalid {}: {}", what, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_search_pattern() {
        assert_eq!(sanitize_search_pattern("").unwrap(), "");
        assert_eq!(sanitize_search_pattern("New*York").unwrap(), "New%York");
        assert_eq!(sanitize_search_pattern("a\\*b").unwrap(), "a*b");
        assert_eq!(sanitize_search_pattern("*mid*").unwrap(), "%mid%");
        assert!(sanitize_search_pattern("*a*b*").is_err());
        assert!(sanitize_search_pattern("100%%%").is_err());
    }

    #[test]
    fn test_blank_input_is_noop() {
        let mut f = QueryFilter::new();
        f.ilike("", "e.title", "title").unwrap();
        f.search("  ", "e.search_text", "search").unwrap();
        f.bitmask("", "ed.accessibility_flags", "accessibility").unwrap();
        f.int_range("", "", "age").unwrap();
        f.column_in_ints("", "e.id", "events").unwrap();
        f.geo_radius("10.0", "", "500", "v.wkb_pos").unwrap();
        f.array_contains(" , ", "e.tags").unwrap();
        assert!(f.is_empty());
        assert!(f.args().is_empty());
        assert_eq!(f.where_clause(), "");
        assert_eq!(f.and_clause(), "");
    }

    #[test]
    fn test_ilike_and_search() {
        let mut f = QueryFilter::new();
        f.ilike("Ber*", "v.city", "city").unwrap();
        f.search("Straße Über", "e.search_text", "search").unwrap();
        assert_eq!(
            f.conditions(),
            &[
                "v.city ILIKE $1".to_string(),
                "e.search_text ILIKE '%' || $2 || '%'".to_string(),
            ]
        );
        assert_eq!(
            f.args(),
            &[SqlArg::from("Ber%"), SqlArg::from("strasse ueber")]
        );
    }

    #[test]
    fn test_ilike_rejects_wildcard_flood() {
        let mut f = QueryFilter::new();
        let err = f.ilike("*a*b*c", "e.title", "title").unwrap_err();
        assert_eq!(err.0, "title format error: *a*b*c");
        assert!(f.is_empty());
    }

    #[test]
    fn test_bitmask() {
        let mut f = QueryFilter::new();
        f.bitmask("1, 3,5", "ed.accessibility_flags", "accessibility").unwrap();
        assert_eq!(
            f.conditions()[0],
            "(ed.accessibility_flags & $1) = $1"
        );
        assert_eq!(f.args(), &[SqlArg::BigInt(Some(42))]);
        assert_eq!(f.next_index(), 2);
    }

    #[test]
    fn test_bitmask_errors() {
        let mut f = QueryFilter::new();
        assert_eq!(
            f.bitmask("1,x", "c", "flags").unwrap_err().0,
            "flags format error: x"
        );
        assert_eq!(
            f.bitmask("63", "c", "flags").unwrap_err().0,
            "flags contains out-of-range flag: 63"
        );
        assert!(f.bitmask("-1", "c", "flags").is_err());
    }

    #[test]
    fn test_int_range_variants() {
        let mut f = QueryFilter::new();
        f.int_range("18", "65", "age").unwrap();
        f.int_range("3", "", "level").unwrap();
        f.int_range("", "100", "seats").unwrap();
        assert_eq!(
            f.conditions(),
            &[
                "(age BETWEEN $1 AND $2)".to_string(),
                "(level >= $3)".to_string(),
                "(seats <= $4)".to_string(),
            ]
        );
        assert!(f.int_range("x", "", "age").is_err());
    }

    #[test]
    fn test_contained_in_column_range() {
        let mut f = QueryFilter::new();
        f.contained_in_column_range("12", "e.min_age", "e.max_age").unwrap();
        f.contained_in_column_range("6, 10", "e.min_age", "e.max_age").unwrap();
        assert_eq!(
            f.conditions(),
            &[
                "($1 BETWEEN COALESCE(e.min_age, 0) AND COALESCE(e.max_age, 1000))".to_string(),
                "(COALESCE(e.min_age, 0) <= $2 AND COALESCE(e.max_age, 1000) >= $3)".to_string(),
            ]
        );
        assert_eq!(
            f.args(),
            &[SqlArg::from(12i32), SqlArg::from(6i32), SqlArg::from(10i32)]
        );
        assert!(f
            .contained_in_column_range("1,2,3", "e.min_age", "e.max_age")
            .is_err());
    }

    #[test]
    fn test_column_in_ints() {
        let mut f = QueryFilter::new();
        f.column_in_ints("4, 8,15", "v.id", "venues").unwrap();
        assert_eq!(f.conditions()[0], "(v.id = ANY($1))");
        assert_eq!(f.args(), &[SqlArg::IntArray(vec![4, 8, 15])]);

        let err = f.column_in_ints("4,a", "v.id", "venues").unwrap_err();
        assert_eq!(err.0, "venues a is invalid");
    }

    #[test]
    fn test_format_builders() {
        let mut f = QueryFilter::starting_after(1);
        f.strings_with_format("DE, ,AT", "v.country_code = ANY({})", "countries")
            .unwrap();
        f.ints_with_format("2,3", "COALESCE(s.space_type_id, 0) = ANY({})", "space_types")
            .unwrap();
        assert_eq!(
            f.conditions(),
            &[
                "v.country_code = ANY($2)".to_string(),
                "COALESCE(s.space_type_id, 0) = ANY($3)".to_string(),
            ]
        );
        assert_eq!(
            f.args()[0],
            SqlArg::TextArray(vec!["DE".to_string(), "AT".to_string()])
        );
    }

    #[test]
    fn test_time_of_day() {
        let mut f = QueryFilter::new();
        f.time_of_day("9,1730", "ed.start_at", "time").unwrap();
        assert_eq!(
            f.conditions()[0],
            "TO_CHAR(ed.start_at, 'HH24:MI') BETWEEN $1 AND $2"
        );
        assert_eq!(f.args(), &[SqlArg::from("09:00"), SqlArg::from("17:30")]);

        assert!(f.time_of_day("9", "c", "time").is_err());
        assert!(f.time_of_day("24,10", "c", "time").is_err());
        assert!(f.time_of_day("0960,10", "c", "time").is_err());
        assert!(f.time_of_day("930,10", "c", "time").is_err());
    }

    #[test]
    fn test_like_any() {
        let mut f = QueryFilter::new();
        f.like_any("24*, 10115", "v.postal_code").unwrap();
        assert_eq!(
            f.conditions()[0],
            "(v.postal_code ILIKE $1 OR v.postal_code ILIKE $2)"
        );
        assert_eq!(f.args(), &[SqlArg::from("24%"), SqlArg::from("10115")]);
    }

    #[test]
    fn test_geo_radius() {
        let mut f = QueryFilter::new();
        f.geo_radius("9.43", "54.78", "1500", "v.wkb_pos").unwrap();
        assert_eq!(
            f.conditions()[0],
            "ST_DWithin(v.wkb_pos::geography, ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography, $3)"
        );
        assert_eq!(
            f.args(),
            &[SqlArg::from(9.43), SqlArg::from(54.78), SqlArg::from(1500.0)]
        );

        let mut f = QueryFilter::new();
        assert_eq!(
            f.geo_radius("abc", "54", "10", "v.wkb_pos").unwrap_err().0,
            "lon 'abc' is invalid"
        );
        assert!(f.geo_radius("9", "95", "10", "v.wkb_pos").is_err());
        assert!(f.geo_radius("9", "54", "-1", "v.wkb_pos").is_err());
        assert!(f.is_empty());
    }

    #[test]
    fn test_json_array_ints() {
        let mut f = QueryFilter::new();
        f.json_array_ints("1,2", "e.types", 0).unwrap();
        assert_eq!(
            f.conditions()[0],
            "EXISTS (SELECT 1 FROM jsonb_array_elements(e.types) AS t(elem) WHERE (elem->>0)::int = ANY($1))"
        );
        assert!(f.json_array_ints(",,", "e.types", 1).is_err());
        assert!(f.json_array_ints("x", "e.types", 1).is_err());
    }

    #[test]
    fn test_array_contains() {
        let mut f = QueryFilter::new();
        f.array_contains("young, festival", "e.tags").unwrap();
        assert_eq!(f.conditions()[0], "e.tags @> $1::text[]");
        assert_eq!(
            f.args()[0],
            SqlArg::TextArray(vec!["young".into(), "festival".into()])
        );
    }

    #[test]
    fn test_limit_offset_follow_conditions() {
        let mut f = QueryFilter::new();
        f.column_in_ints("1", "e.id", "events").unwrap();
        let clause = f.limit_offset("20", "40").unwrap();
        assert_eq!(clause, "LIMIT $2 OFFSET $3");
        assert_eq!(f.args().len(), 3);

        let mut f = QueryFilter::new();
        assert_eq!(f.limit_offset("", "5").unwrap(), "OFFSET $1");
        assert!(f.limit_offset("0", "").is_err());
        assert!(f.limit_offset("", "-1").is_err());
    }

    #[test]
    fn test_where_and_push() {
        let mut f = QueryFilter::new();
        f.push("e.organizer_id = {}", 7i32)
            .push_condition("ed.start_at >= NOW()");
        assert_eq!(
            f.where_clause(),
            "WHERE e.organizer_id = $1 AND ed.start_at >= NOW()"
        );
        assert_eq!(
            f.and_clause(),
            " AND e.organizer_id = $1 AND ed.start_at >= NOW()"
        );
    }

    #[test]
    fn test_parse_int_list() {
        assert_eq!(parse_int_list("1, 2,,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_int_list("1,b").unwrap_err(), "b");
    }
}
