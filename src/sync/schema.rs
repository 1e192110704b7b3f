//! Sheet column schema for the ads spreadsheet.
//!
//! The sheet is mapped by header name, not column position, so admins can
//! reorder or drop columns without code changes. The full set of recognized
//! columns is the closed table below; casting is a typed dispatch over
//! [`FieldKind`] rather than per-column string matching. A renamed column
//! simply stops matching and its values are silently ignored.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::models::ad::{AdTier, Model as AdModel, PLACEHOLDER_IMAGE};
use crate::models::ad_image::Model as AdImageModel;
use crate::repositories::AdFields;

/// How a sheet cell is interpreted when pulled into the database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// The ad identifier; drives create-vs-update, never cast.
    Id,
    /// The owning tenant's domain; resolved to a tenant id, never stored.
    TenantDomain,
    /// Comma-separated image URL list; split, trimmed, empties dropped.
    ImageUrls,
    /// Trimmed string passthrough, empty when absent.
    Text,
    /// Listing tier; `BASIC` unless the cell is exactly `PREMIUM`.
    Tier,
    /// Integer with a default for blank or unparseable cells.
    Integer { default: i32 },
    /// `true` iff the upper-cased cell equals `TRUE`; blank takes the
    /// field-specific default.
    Bool { default: bool },
    /// Float, or null when blank or unparseable. Only lat/lng.
    Float,
}

/// The recognized columns, in push (export) order.
pub const SHEET_SCHEMA: &[(&str, FieldKind)] = &[
    ("id", FieldKind::Id),
    ("tenantDomain", FieldKind::TenantDomain),
    ("businessName", FieldKind::Text),
    ("type", FieldKind::Tier),
    ("slug", FieldKind::Text),
    ("description", FieldKind::Text),
    ("phone", FieldKind::Text),
    ("email", FieldKind::Text),
    ("web", FieldKind::Text),
    ("address", FieldKind::Text),
    ("lat", FieldKind::Float),
    ("lng", FieldKind::Float),
    ("tags", FieldKind::Text),
    ("isActive", FieldKind::Bool { default: false }),
    ("displayPhone", FieldKind::Bool { default: true }),
    ("displayEmail", FieldKind::Bool { default: true }),
    ("displayOnMap", FieldKind::Bool { default: true }),
    ("grid_w", FieldKind::Integer { default: 1 }),
    ("grid_h", FieldKind::Integer { default: 1 }),
    ("adminNotes", FieldKind::Text),
    ("imageUrls", FieldKind::ImageUrls),
];

/// The header row written by push, in schema order.
pub fn header_row() -> Vec<String> {
    SHEET_SCHEMA
        .iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Find the field kind for a header cell, if the column is recognized.
pub fn lookup(column: &str) -> Option<FieldKind> {
    SHEET_SCHEMA
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, kind)| *kind)
}

/// A data row interpreted against the header, ready for upsert.
#[derive(Debug, Clone, Default)]
pub struct ParsedRow {
    /// Raw `id` cell (trimmed); length decides create vs update.
    pub id_cell: String,
    /// Raw `tenantDomain` cell (trimmed).
    pub tenant_domain: String,
    /// Ordered image URLs from the `imageUrls` cell.
    pub image_urls: Vec<String>,
    /// Every scalar field, cast per its kind with defaults applied.
    pub fields: AdFields,
}

/// Map one sheet row to typed ad fields using the header for column names.
///
/// Missing trailing cells are treated as absent. Unknown columns are
/// ignored. The cover image is force-set from the first image URL.
pub fn parse_row(header: &[String], cells: &[String]) -> ParsedRow {
    let mut row = ParsedRow::default();

    for (index, column) in header.iter().enumerate() {
        let cell = cells.get(index).map(String::as_str).unwrap_or("");
        let Some(kind) = lookup(column) else {
            continue;
        };

        match kind {
            FieldKind::Id => row.id_cell = cell.trim().to_string(),
            FieldKind::TenantDomain => row.tenant_domain = cell.trim().to_string(),
            FieldKind::ImageUrls => row.image_urls = split_image_urls(cell),
            FieldKind::Tier => row.fields.tier = AdTier::from_cell(cell),
            FieldKind::Text => assign_text(&mut row.fields, column, cell.trim()),
            FieldKind::Integer { default } => {
                assign_integer(&mut row.fields, column, parse_integer(cell, default))
            }
            FieldKind::Bool { default } => {
                assign_bool(&mut row.fields, column, parse_bool(cell, default))
            }
            FieldKind::Float => assign_float(&mut row.fields, column, parse_float(cell)),
        }
    }

    row.fields.image_src = row
        .image_urls
        .first()
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    // A coordinate is only usable as a pair; drop a lone lat or lng.
    if row.fields.lat.is_some() != row.fields.lng.is_some() {
        row.fields.lat = None;
        row.fields.lng = None;
    }

    row
}

fn assign_text(fields: &mut AdFields, column: &str, value: &str) {
    let value = value.to_string();
    match column {
        "businessName" => fields.business_name = value,
        "slug" => fields.slug = value,
        "description" => fields.description = value,
        "phone" => fields.phone = value,
        "email" => fields.email = value,
        "web" => fields.web = value,
        "address" => fields.address = value,
        "tags" => fields.tags = value,
        "adminNotes" => fields.admin_notes = value,
        _ => {}
    }
}

fn assign_integer(fields: &mut AdFields, column: &str, value: i32) {
    match column {
        "grid_w" => fields.grid_w = value,
        "grid_h" => fields.grid_h = value,
        _ => {}
    }
}

fn assign_bool(fields: &mut AdFields, column: &str, value: bool) {
    match column {
        "isActive" => fields.is_active = value,
        "displayPhone" => fields.display_phone = value,
        "displayEmail" => fields.display_email = value,
        "displayOnMap" => fields.display_on_map = value,
        _ => {}
    }
}

fn assign_float(fields: &mut AdFields, column: &str, value: Option<f64>) {
    match column {
        "lat" => fields.lat = value,
        "lng" => fields.lng = value,
        _ => {}
    }
}

/// `true` iff the upper-cased cell equals `TRUE`; blank takes the default.
pub fn parse_bool(cell: &str, default: bool) -> bool {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return default;
    }
    trimmed.to_uppercase() == "TRUE"
}

/// Integer, or the default for blank/unparseable cells.
pub fn parse_integer(cell: &str, default: i32) -> i32 {
    cell.trim().parse().unwrap_or(default)
}

/// Float, or null for blank/unparseable cells.
pub fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse().ok().filter(|f: &f64| f.is_finite())
}

/// Split an `imageUrls` cell on commas, trimming and dropping empties.
pub fn split_image_urls(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Join gallery URLs for export (comma + space, creation order).
pub fn join_image_urls(images: &[AdImageModel]) -> String {
    images
        .iter()
        .map(|img| img.url.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Flatten one ad with its tenant domain and gallery into a sheet row, in
/// schema order. Nulls become empty strings; booleans export as TRUE/FALSE
/// so they survive the pull cast.
pub fn flatten_ad(ad: &AdModel, tenant_domain: &str, images: &[AdImageModel]) -> Vec<String> {
    SHEET_SCHEMA
        .iter()
        .map(|(column, _)| match *column {
            "id" => ad.id.clone(),
            "tenantDomain" => tenant_domain.to_string(),
            "businessName" => ad.business_name.clone(),
            "type" => ad.tier.as_str().to_string(),
            "slug" => ad.slug.clone(),
            "description" => ad.description.clone(),
            "phone" => ad.phone.clone(),
            "email" => ad.email.clone(),
            "web" => ad.web.clone(),
            "address" => ad.address.clone(),
            "lat" => float_cell(ad.lat),
            "lng" => float_cell(ad.lng),
            "tags" => ad.tags.clone(),
            "isActive" => bool_cell(ad.is_active),
            "displayPhone" => bool_cell(ad.display_phone),
            "displayEmail" => bool_cell(ad.display_email),
            "displayOnMap" => bool_cell(ad.display_on_map),
            "grid_w" => ad.grid_w.to_string(),
            "grid_h" => ad.grid_h.to_string(),
            "adminNotes" => ad.admin_notes.clone(),
            "imageUrls" => join_image_urls(images),
            other => unreachable!("column {} missing from flatten", other),
        })
        .collect()
}

fn bool_cell(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

fn float_cell(value: Option<f64>) -> String {
    value.map(|f| f.to_string()).unwrap_or_default()
}

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static pattern compiles"));

/// Generate a detail-page slug from a business name: lower-case, runs of
/// non-alphanumeric characters collapsed to single hyphens, plus a random
/// numeric suffix. Reduces collision risk; does not guarantee uniqueness.
pub fn generate_slug(business_name: &str) -> String {
    let lowered = business_name.to_lowercase();
    let base = NON_ALPHANUMERIC_RUN.replace_all(&lowered, "-");
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("{}-{}", base, suffix)
}

/// A1 column letters for a zero-based column index (0 → A, 25 → Z, 26 → AA).
pub fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ASCII letters")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn booleans_parse_case_insensitively_with_defaults() {
        assert!(parse_bool("TRUE", false));
        assert!(parse_bool("true", false));
        assert!(parse_bool("True", false));
        assert!(!parse_bool("yes", true));
        assert!(!parse_bool("FALSE", true));
        // Blank takes the field-specific default.
        assert!(!parse_bool("", false));
        assert!(parse_bool("  ", true));
    }

    #[test]
    fn integers_default_when_blank_or_unparseable() {
        assert_eq!(parse_integer("3", 1), 3);
        assert_eq!(parse_integer("0", 1), 0);
        assert_eq!(parse_integer("", 1), 1);
        assert_eq!(parse_integer("wide", 1), 1);
    }

    #[test]
    fn floats_parse_or_null() {
        assert_eq!(parse_float("51.5"), Some(51.5));
        assert_eq!(parse_float("-0.1"), Some(-0.1));
        assert_eq!(parse_float(""), None);
        assert_eq!(parse_float("north"), None);
    }

    #[test]
    fn image_urls_split_trim_and_drop_empties() {
        assert_eq!(
            split_image_urls("https://a/1.jpg, https://a/2.jpg,, "),
            vec!["https://a/1.jpg".to_string(), "https://a/2.jpg".to_string()]
        );
        assert!(split_image_urls("").is_empty());
    }

    #[test]
    fn parse_row_maps_by_header_name_not_position() {
        let header = header(&["businessName", "isActive", "tenantDomain", "lat", "lng"]);
        let cells = cells(&["Joe's Cafe", "", "example.com", "51.5", "-0.1"]);

        let row = parse_row(&header, &cells);
        assert_eq!(row.fields.business_name, "Joe's Cafe");
        assert_eq!(row.tenant_domain, "example.com");
        assert_eq!(row.fields.lat, Some(51.5));
        assert_eq!(row.fields.lng, Some(-0.1));
        // Blank isActive defaults to false; toggles default true when the
        // columns are missing entirely.
        assert!(!row.fields.is_active);
        assert!(row.fields.display_phone);
        assert!(row.fields.display_email);
        assert!(row.fields.display_on_map);
        assert_eq!(row.fields.grid_w, 1);
        assert_eq!(row.fields.image_src, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn parse_row_tolerates_missing_trailing_cells_and_unknown_columns() {
        let header = header(&["businessName", "mystery", "phone", "grid_w"]);
        let cells = cells(&["Joe's Cafe"]);

        let row = parse_row(&header, &cells);
        assert_eq!(row.fields.business_name, "Joe's Cafe");
        assert_eq!(row.fields.phone, "");
        assert_eq!(row.fields.grid_w, 1);
    }

    #[test]
    fn parse_row_drops_a_lone_coordinate() {
        let header = header(&["businessName", "lat", "lng"]);

        let row = parse_row(&header, &cells(&["Joe's Cafe", "51.5", "north"]));
        assert_eq!(row.fields.lat, None);
        assert_eq!(row.fields.lng, None);

        let row = parse_row(&header, &cells(&["Joe's Cafe", "", "-0.1"]));
        assert_eq!(row.fields.lat, None);
        assert_eq!(row.fields.lng, None);

        let row = parse_row(&header, &cells(&["Joe's Cafe", "51.5", "-0.1"]));
        assert_eq!(row.fields.lat, Some(51.5));
        assert_eq!(row.fields.lng, Some(-0.1));
    }

    #[test]
    fn parse_row_sets_cover_image_from_first_url() {
        let header = header(&["businessName", "imageUrls"]);
        let cells = cells(&["Joe's Cafe", "https://a/1.jpg, https://a/2.jpg"]);

        let row = parse_row(&header, &cells);
        assert_eq!(row.fields.image_src, "https://a/1.jpg");
        assert_eq!(row.image_urls.len(), 2);
    }

    #[test]
    fn tags_pass_through_unmodified_as_a_string() {
        let header = header(&["businessName", "tags"]);
        let cells = cells(&["Joe's Cafe", "Plumber, Emergency"]);

        let row = parse_row(&header, &cells);
        assert_eq!(row.fields.tags, "Plumber, Emergency");
    }

    #[test]
    fn flatten_round_trips_through_parse() {
        let now = Utc::now();
        let ad = AdModel {
            id: "0123456789abcdef0123456789abcdef".to_string(),
            tenant_id: Uuid::new_v4(),
            business_name: "Joe's Cafe".to_string(),
            tier: AdTier::Premium,
            slug: "joe-s-cafe-42".to_string(),
            description: "Coffee and pastries".to_string(),
            phone: "01234 567890".to_string(),
            email: "joe@example.com".to_string(),
            web: "https://joes.example.com".to_string(),
            address: "1 High St".to_string(),
            tags: "Plumber, Emergency".to_string(),
            admin_notes: String::new(),
            lat: Some(51.5),
            lng: Some(-0.1),
            image_src: "https://a/1.jpg".to_string(),
            is_active: true,
            display_phone: true,
            display_email: false,
            display_on_map: true,
            grid_w: 2,
            grid_h: 1,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let images = vec![
            AdImageModel {
                id: Uuid::new_v4(),
                ad_id: ad.id.clone(),
                url: "https://a/1.jpg".to_string(),
                alt: None,
                created_at: now.into(),
            },
            AdImageModel {
                id: Uuid::new_v4(),
                ad_id: ad.id.clone(),
                url: "https://a/2.jpg".to_string(),
                alt: None,
                created_at: now.into(),
            },
        ];

        let flat = flatten_ad(&ad, "example.com", &images);
        assert_eq!(flat.len(), SHEET_SCHEMA.len());

        let row = parse_row(&header_row(), &flat);
        assert_eq!(row.id_cell, ad.id);
        assert_eq!(row.tenant_domain, "example.com");
        assert_eq!(row.fields.business_name, ad.business_name);
        assert_eq!(row.fields.tier, AdTier::Premium);
        assert_eq!(row.fields.tags, "Plumber, Emergency");
        assert_eq!(row.fields.lat, Some(51.5));
        assert_eq!(row.fields.lng, Some(-0.1));
        assert!(row.fields.is_active);
        assert!(!row.fields.display_email);
        assert_eq!(row.fields.grid_w, 2);
        assert_eq!(row.image_urls, vec!["https://a/1.jpg", "https://a/2.jpg"]);
        assert_eq!(row.fields.image_src, "https://a/1.jpg");
    }

    #[test]
    fn slugs_are_lowercase_hyphenated_with_numeric_suffix() {
        let slug = generate_slug("Joe's Cafe");
        assert!(slug.starts_with("joe-s-cafe"));
        let suffix = slug.rsplit('-').next().unwrap();
        assert!(suffix.parse::<u32>().is_ok());
        assert!(suffix.parse::<u32>().unwrap() < 10_000);
    }

    #[test]
    fn column_letters_cover_multi_letter_columns() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(20), "U");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
    }
}
