/// Column-name constants for the WBL dataset.
/// Single source of truth - exported to Python via PyO3.

// ── Source dataset columns ──────────────────────────────────────────────────
pub mod columns {
    pub const ECONOMY: &str = "Economy";
    pub const REGION: &str = "Region";
    pub const REPORT_YEAR: &str = "Report Year";
    pub const WBL_INDEX: &str = "WBL INDEX";

    /// Columns the loader refuses to run without.
    pub const REQUIRED: [&str; 12] = [
        REGION,
        ECONOMY,
        REPORT_YEAR,
        WBL_INDEX,
        super::categories::MOBILITY,
        super::categories::WORKPLACE,
        super::categories::PAY,
        super::categories::MARRIAGE,
        super::categories::PARENTHOOD,
        super::categories::ENTREPRENEURSHIP,
        super::categories::ASSETS,
        super::categories::PENSION,
    ];
}

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const ID_TEMP: &str = "id_temp";
    pub const ID_REG: &str = "id_reg";
    pub const DUMMY: &str = "dummy";
}

// ── Category score columns (also the category keys) ─────────────────────────
pub mod categories {
    pub const MOBILITY: &str = "MOBILITY";
    pub const WORKPLACE: &str = "WORKPLACE";
    pub const PAY: &str = "PAY";
    pub const MARRIAGE: &str = "MARRIAGE";
    pub const PARENTHOOD: &str = "PARENTHOOD";
    pub const ENTREPRENEURSHIP: &str = "ENTREPRENEURSHIP";
    pub const ASSETS: &str = "ASSETS";
    pub const PENSION: &str = "PENSION";

    pub const ALL: [&str; 8] = [
        MOBILITY,
        WORKPLACE,
        PAY,
        MARRIAGE,
        PARENTHOOD,
        ENTREPRENEURSHIP,
        ASSETS,
        PENSION,
    ];
}

// ── Region names, in dummy order ────────────────────────────────────────────
pub mod regions {
    pub const SOUTH_ASIA: &str = "South Asia";
    pub const EAST_ASIA_PACIFIC: &str = "East Asia & Pacific";
    pub const MIDDLE_EAST_NORTH_AFRICA: &str = "Middle East & North Africa";
    pub const SUB_SAHARAN_AFRICA: &str = "Sub-Saharan Africa";
    pub const LATIN_AMERICA_CARIBBEAN: &str = "Latin America & Caribbean";
    pub const EUROPE_CENTRAL_ASIA: &str = "Europe & Central Asia";
    pub const HIGH_INCOME_OECD: &str = "High income: OECD";

    pub const ALL: [&str; 7] = [
        SOUTH_ASIA,
        EAST_ASIA_PACIFIC,
        MIDDLE_EAST_NORTH_AFRICA,
        SUB_SAHARAN_AFRICA,
        LATIN_AMERICA_CARIBBEAN,
        EUROPE_CENTRAL_ASIA,
        HIGH_INCOME_OECD,
    ];
}

// ── Report year bounds offered to the year slider ───────────────────────────
pub mod years {
    pub const FIRST: i32 = 1971;
    pub const LAST: i32 = 2023;
}
