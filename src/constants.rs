/// Identifier stamped on every record as `source_name`
pub const SOURCE_NAME: &str = "platinumlist";

/// Host suffix that outbound links must match to count as source-site links
pub const SOURCE_HOST: &str = "platinumlist.net";

/// Path segment that marks an event ticket detail page
pub const TICKET_PATH_MARKER: &str = "/event-tickets/";

/// Path segments of listing pages that look like events but are not
pub const EXCLUDED_PATH_MARKERS: &[&str] = &["/attraction/", "/attractions/", "/tour/", "/tours/", "/things-to-do/"];

/// A category listing page on the source site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryEndpoint {
    pub name: &'static str,
    pub url: &'static str,
}

pub const CATEGORY_ENDPOINTS: &[CategoryEndpoint] = &[
    CategoryEndpoint { name: "concerts", url: "https://manama.platinumlist.net/concerts" },
    CategoryEndpoint { name: "comedy", url: "https://manama.platinumlist.net/comedy" },
    CategoryEndpoint { name: "theatre", url: "https://manama.platinumlist.net/theatre" },
    CategoryEndpoint { name: "sports", url: "https://manama.platinumlist.net/sports" },
    CategoryEndpoint { name: "nightlife", url: "https://manama.platinumlist.net/nightlife" },
    CategoryEndpoint { name: "festivals", url: "https://manama.platinumlist.net/festivals" },
    CategoryEndpoint { name: "kids-family", url: "https://manama.platinumlist.net/kids-family" },
];

// Affiliate redirect
pub const AFFILIATE_BASE_URL: &str = "https://platinumlist.net/aff/";
pub const AFFILIATE_PARTNER_CODE: &str = "bhevents";

// Currency
pub const LOCAL_CURRENCY: &str = "BHD";
/// USD -> BHD, the peg rate
pub const USD_TO_LOCAL_RATE: f64 = 0.376;

// Defaults for absent venue fields
pub const DEFAULT_VENUE_NAME: &str = "Various Locations";
pub const DEFAULT_VENUE_ADDRESS: &str = "Bahrain";

/// Publication state for successfully ingested records
pub const STATUS_PUBLISHED: &str = "published";

/// Image addresses containing any of these are never used as event art
pub const IMAGE_EXCLUDE_MARKERS: &[&str] = &["promo", "banner", "logo"];

pub const IMAGE_CONTENT_TYPE: &str = "image/webp";
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000";
