//! Locates the coordinate columns of a survey table.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepted header names per axis, in order of preference.
///
/// Matching is exact; listing both `x` and `X` is what makes the lookup case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisCandidates {
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub z: Vec<String>,
}

impl AxisCandidates {
    /// Lowercase and uppercase spelling of each name, lowercase first.
    #[must_use]
    pub fn case_variants(x: &str, y: &str, z: &str) -> Self {
        let variants = |name: &str| {
            let mut names = vec![name.to_lowercase()];
            let upper = name.to_uppercase();
            if upper != names[0] {
                names.push(upper);
            }
            names
        };
        Self {
            x: variants(x),
            y: variants(y),
            z: variants(z),
        }
    }

    #[must_use]
    pub fn for_axis(&self, axis: Axis) -> &[String] {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl Default for AxisCandidates {
    fn default() -> Self {
        Self::case_variants("x", "y", "z")
    }
}

/// Header names that were found for each axis, with their column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub x: String,
    pub y: String,
    pub z: String,
    indices: [usize; 3],
}

impl ResolvedColumns {
    #[must_use]
    pub fn get(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Position of the axis column within the resolved table's rows.
    #[must_use]
    pub fn index(&self, axis: Axis) -> usize {
        self.indices[axis as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAxis {
    pub axis: Axis,
    pub candidates: Vec<String>,
    /// Closest header present in the table, if any came near.
    pub suggestion: Option<String>,
}

/// One or more axes had none of their candidate names among the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumnError {
    pub missing: Vec<MissingAxis>,
}

impl MissingColumnError {
    #[must_use]
    pub fn axes(&self) -> Vec<Axis> {
        self.missing.iter().map(|m| m.axis).collect()
    }
}

impl fmt::Display for MissingColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            "the table needs columns named x, y and z (case-insensitive); missing axis",
        )?;
        for (idx, missing) in self.missing.iter().enumerate() {
            let sep = if idx == 0 { " " } else { ", " };
            write!(f, "{sep}{}", missing.axis)?;
            if let Some(suggestion) = missing.suggestion.as_deref() {
                write!(f, " (did you mean '{suggestion}'?)")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for MissingColumnError {}

/// Picks the column for every axis: the first candidate that is a header of `table`.
pub fn resolve(
    table: &Table,
    candidates: &AxisCandidates,
) -> Result<ResolvedColumns, MissingColumnError> {
    let mut found: [Option<(&str, usize)>; 3] = [None; 3];
    for (slot, axis) in found.iter_mut().zip(Axis::ALL) {
        *slot = candidates.for_axis(axis).iter().find_map(|name| {
            table
                .column_index(name)
                .map(|idx| (name.as_str(), idx))
        });
    }

    if let [Some((x, x_idx)), Some((y, y_idx)), Some((z, z_idx))] = found {
        log::debug!("resolved coordinate columns x='{x}', y='{y}', z='{z}'");
        return Ok(ResolvedColumns {
            x: x.to_owned(),
            y: y.to_owned(),
            z: z.to_owned(),
            indices: [x_idx, y_idx, z_idx],
        });
    }

    let claimed: Vec<&str> = found.iter().flatten().map(|(name, _)| *name).collect();
    let missing = Axis::ALL
        .into_iter()
        .zip(found)
        .filter(|(_, name)| name.is_none())
        .map(|(axis, _)| {
            let names = candidates.for_axis(axis);
            MissingAxis {
                axis,
                candidates: names.to_vec(),
                suggestion: suggest_header(table.headers(), &claimed, names),
            }
        })
        .collect();
    Err(MissingColumnError { missing })
}

/// Nearest unclaimed header by edit distance after trimming and lowercasing.
fn suggest_header(headers: &[String], claimed: &[&str], candidates: &[String]) -> Option<String> {
    headers
        .iter()
        .filter(|header| !claimed.contains(&header.as_str()))
        .filter_map(|header| {
            let folded = header.trim().to_lowercase();
            candidates
                .iter()
                .filter_map(|candidate| {
                    let target = candidate.to_lowercase();
                    let limit = target.chars().count() / 4;
                    let distance = levenshtein::levenshtein(&folded, &target);
                    (distance <= limit).then_some(distance)
                })
                .min()
                .map(|distance| (distance, header))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, header)| header.clone())
}

#[cfg(test)]
mod tests {
    use super::{Axis, AxisCandidates, resolve};
    use crate::table::Table;

    fn headers(names: &[&str]) -> Table {
        Table::new(names.iter().map(|n| (*n).to_owned()).collect())
    }

    #[test]
    fn resolves_lowercase_headers() {
        let resolved = resolve(&headers(&["id", "x", "y", "z"]), &AxisCandidates::default())
            .expect("lowercase resolves");
        assert_eq!(resolved.x, "x");
        assert_eq!(resolved.get(Axis::Z), "z");
        assert_eq!(resolved.index(Axis::X), 1);
        assert_eq!(resolved.index(Axis::Z), 3);
    }

    #[test]
    fn resolves_uppercase_headers() {
        let resolved = resolve(&headers(&["X", "Y", "Z"]), &AxisCandidates::default())
            .expect("uppercase resolves");
        assert_eq!(resolved.x, "X");
        assert_eq!(resolved.y, "Y");
        assert_eq!(resolved.z, "Z");
    }

    #[test]
    fn candidate_order_decides_between_variants() {
        let resolved = resolve(&headers(&["X", "x", "y", "z"]), &AxisCandidates::default())
            .expect("resolves");
        assert_eq!(resolved.x, "x");

        let upper_first = AxisCandidates {
            x: vec!["X".into(), "x".into()],
            ..AxisCandidates::default()
        };
        let resolved = resolve(&headers(&["X", "x", "y", "z"]), &upper_first).expect("resolves");
        assert_eq!(resolved.x, "X");
    }

    #[test]
    fn missing_z_names_only_z() {
        let err = resolve(&headers(&["x", "y", "elevation"]), &AxisCandidates::default())
            .expect_err("z is missing");
        assert_eq!(err.axes(), vec![Axis::Z]);
        assert_eq!(err.missing[0].candidates, ["z", "Z"]);
        let message = err.to_string();
        assert!(message.contains("case-insensitive"), "{message}");
        assert!(message.ends_with("missing axis z"), "{message}");
    }

    #[test]
    fn reports_every_missing_axis() {
        let err = resolve(&headers(&["a", "b"]), &AxisCandidates::default()).expect_err("none");
        assert_eq!(err.axes(), vec![Axis::X, Axis::Y, Axis::Z]);
    }

    #[test]
    fn suggests_padded_header() {
        let err = resolve(&headers(&["x", "y", " Z "]), &AxisCandidates::default())
            .expect_err("padded header is not exact");
        assert_eq!(err.missing[0].suggestion.as_deref(), Some(" Z "));
        assert!(err.to_string().contains("did you mean ' Z '?"));
    }

    #[test]
    fn custom_names_get_fuzzy_suggestions() {
        let candidates = AxisCandidates::case_variants("easting", "northing", "elevation");
        assert_eq!(candidates.x, ["easting", "EASTING"]);
        let err = resolve(&headers(&["Easting", "northing", "elevaton"]), &candidates)
            .expect_err("neither spelling matches");
        assert_eq!(err.axes(), vec![Axis::X, Axis::Z]);
        assert_eq!(err.missing[0].suggestion.as_deref(), Some("Easting"));
        assert_eq!(err.missing[1].suggestion.as_deref(), Some("elevaton"));
    }
}
