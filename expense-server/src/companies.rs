//! Known transportation companies.

use crate::domain::TransportationType;

/// Railway operators offered as company suggestions.
pub const RAILWAY_COMPANIES: &[&str] = &[
    "JR東日本",
    "JR東海",
    "JR西日本",
    "JR北海道",
    "JR四国",
    "JR九州",
    "東京メトロ",
    "都営地下鉄",
    "京王電鉄",
    "小田急電鉄",
    "東急電鉄",
    "京急電鉄",
    "西武鉄道",
    "東武鉄道",
    "近畿日本鉄道",
    "阪急電鉄",
    "阪神電気鉄道",
    "南海電気鉄道",
    "名古屋鉄道",
    "西日本鉄道",
    "札幌市交通局",
];

/// Bus operators offered as company suggestions.
pub const BUS_COMPANIES: &[&str] = &[
    "東急バス",
    "京王バス",
    "小田急バス",
    "西武バス",
    "東武バス",
    "京成バス",
    "京浜急行バス",
    "神奈川中央交通",
    "横浜市営バス",
    "川崎市営バス",
    "千葉中央バス",
    "ちばシティバス",
    "大阪シティバス",
    "京都市営バス",
    "阪急バス",
    "阪神バス",
    "近鉄バス",
    "南海バス",
    "神戸市営バス",
    "名古屋市営バス",
    "名鉄バス",
    "三重交通",
    "西鉄バス",
    "福岡市営バス",
    "長崎バス",
    "札幌市営バス",
    "じょうてつバス",
    "仙台市営バス",
    "広島電鉄",
    "岡山電気軌道",
];

/// Suggestions for the given transportation type.
pub fn companies_for(transportation_type: TransportationType) -> &'static [&'static str] {
    match transportation_type {
        TransportationType::Train => RAILWAY_COMPANIES,
        TransportationType::Bus => BUS_COMPANIES,
    }
}

/// Guess the operating company from a line label such as "JR山手線".
///
/// Only a handful of well-known lines are recognised. JR lines that match
/// no regional company come back as plain "JR".
pub fn guess_company_from_line(line: &str) -> Option<&'static str> {
    let has = |needle: &str| line.contains(needle);

    if has("JR") {
        let company = if has("東海道") || has("中央") {
            "JR東海"
        } else if has("東北") || has("山手") || has("埼京") {
            "JR東日本"
        } else if has("西日本") || has("山陽") {
            "JR西日本"
        } else {
            "JR"
        };
        return Some(company);
    }

    if has("東京メトロ") {
        Some("東京メトロ")
    } else if has("京王") {
        Some("京王電鉄")
    } else if has("小田急") {
        Some("小田急電鉄")
    } else {
        None
    }
}
