//! Plain-text rendering of the discovered launch tree

use crate::models::LaunchSummary;
use std::fmt::Write;

/// Shown instead of a tree when the portal lists nothing
pub const NO_FLATS: &str = "No flats available ):";

/// Renders launches, towns and flat types, one line each
///
/// Each launch block ends with a blank line.
pub fn render_available_flats(launches: &[LaunchSummary]) -> String {
    if launches.is_empty() {
        return format!("{}\n", NO_FLATS);
    }

    let mut out = String::new();
    for launch in launches {
        let _ = writeln!(out, "{}", launch.launch_date);
        for town in &launch.towns {
            let _ = writeln!(out, "{}", town.town);
            for flat in &town.flat_types {
                let _ = writeln!(
                    out,
                    "{} - {} units - Malay : {}, Chinese : {}, Indian : {}",
                    flat.flat_type_label,
                    flat.units_available,
                    flat.quota_malay,
                    flat.quota_chinese,
                    flat.quota_indian_others
                );
            }
        }
        out.push('\n');
    }
    out
}
