use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    pub name: &'static str,
    pub iso: &'static str,
    pub dial_code: &'static str,
}

const fn country(name: &'static str, iso: &'static str, dial_code: &'static str) -> Country {
    Country {
        name,
        iso,
        dial_code,
    }
}

pub const COUNTRIES: &[Country] = &[
    country("Algeria", "DZ", "+213"),
    country("Bahrain", "BH", "+973"),
    country("Canada", "CA", "+1"),
    country("Egypt", "EG", "+20"),
    country("France", "FR", "+33"),
    country("Germany", "DE", "+49"),
    country("India", "IN", "+91"),
    country("Jordan", "JO", "+962"),
    country("Kazakhstan", "KZ", "+7"),
    country("Kuwait", "KW", "+965"),
    country("Lebanon", "LB", "+961"),
    country("Morocco", "MA", "+212"),
    country("Oman", "OM", "+968"),
    country("Pakistan", "PK", "+92"),
    country("Qatar", "QA", "+974"),
    country("Saudi Arabia", "SA", "+966"),
    country("Spain", "ES", "+34"),
    country("Tajikistan", "TJ", "+992"),
    country("Tunisia", "TN", "+216"),
    country("Turkey", "TR", "+90"),
    country("United Arab Emirates", "AE", "+971"),
    country("United Kingdom", "GB", "+44"),
    country("United States", "US", "+1"),
    country("Uzbekistan", "UZ", "+998"),
];

pub fn find_by_dial_code(code: &str) -> Option<&'static Country> {
    let code = code.trim();
    COUNTRIES.iter().find(|c| c.dial_code == code)
}
