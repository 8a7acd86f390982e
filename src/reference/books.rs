//! Canonical book table.
//!
//! Book numbers are 1-indexed positions in [`BIBLE_BOOKS`] and follow the
//! ordering of the bundled corpus (Protestant order: Acts, then the Pauline
//! letters, Hebrews, then the general epistles).

use serde::Serialize;

pub const BOOK_COUNT: u32 = 66;

pub const BIBLE_BOOKS: [&str; 66] = [
    "Бытие",
    "Исход",
    "Левит",
    "Числа",
    "Второзаконие",
    "Иисус Навин",
    "Книга Судей",
    "Руфь",
    "1 Царств",
    "2 Царств",
    "3 Царств",
    "4 Царств",
    "1 Паралипоменон",
    "2 Паралипоменон",
    "Ездра",
    "Неемия",
    "Есфирь",
    "Иов",
    "Псалтирь",
    "Притчи",
    "Екклесиаст",
    "Песнь Песней",
    "Исаия",
    "Иеремия",
    "Плач Иеремии",
    "Иезекииль",
    "Даниил",
    "Осия",
    "Иоиль",
    "Амос",
    "Авдий",
    "Иона",
    "Михей",
    "Наум",
    "Аввакум",
    "Софония",
    "Аггей",
    "Захария",
    "Малахия",
    "От Матфея",
    "От Марка",
    "От Луки",
    "От Иоанна",
    "Деяния",
    "Римлянам",
    "1 Коринфянам",
    "2 Коринфянам",
    "Галатам",
    "Ефесянам",
    "Филиппийцам",
    "Колоссянам",
    "1 Фессалоникийцам",
    "2 Фессалоникийцам",
    "1 Тимофею",
    "2 Тимофею",
    "Титу",
    "Филимону",
    "Евреям",
    "Иакова",
    "1 Петра",
    "2 Петра",
    "1 Иоанна",
    "2 Иоанна",
    "3 Иоанна",
    "Иуды",
    "Откровение",
];

/// Short forms keyed by the lowercased canonical name.
pub const BOOK_ALIASES: &[(&str, &[&str])] = &[
    ("бытие", &["быт", "бт"]),
    ("исход", &["исх", "ис"]),
    ("левит", &["лев", "лв"]),
    ("числа", &["чис", "чс"]),
    ("второзаконие", &["втор", "вт"]),
    ("иисус навин", &["нав", "нв"]),
    ("книга судей", &["суд", "сд"]),
    ("руфь", &["руф", "ру"]),
    ("от матфея", &["матф", "мф"]),
    ("от марка", &["марк", "мк"]),
    ("от луки", &["лука", "лк"]),
    ("от иоанна", &["иоан", "ин"]),
    ("деяния", &["деян"]),
    ("иакова", &["иак"]),
    ("1 петра", &["1 пет", "1пет"]),
    ("2 петра", &["2 пет", "2пет"]),
    ("римлянам", &["рим"]),
    ("1 коринфянам", &["1 кор", "1кор"]),
    ("2 коринфянам", &["2 кор", "2кор"]),
    ("галатам", &["галат"]),
    ("ефесянам", &["еф"]),
    ("филиппийцам", &["фил", "флп"]),
    ("откровение", &["откр", "от"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

pub const OLD_TESTAMENT_END: u32 = 39;

impl Testament {
    pub fn of(book: u32) -> Self {
        if book <= OLD_TESTAMENT_END {
            Testament::Old
        } else {
            Testament::New
        }
    }
}

/// A named run of consecutive books.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Section {
    pub name: &'static str,
    pub start: u32,
    pub end: u32,
}

const fn section(name: &'static str, start: u32, end: u32) -> Section {
    Section { name, start, end }
}

pub const SECTIONS: [Section; 10] = [
    section("Пятикнижие", 1, 5),
    section("Исторические книги", 6, 17),
    section("Учительные книги", 18, 22),
    section("Большие пророки", 23, 27),
    section("Малые пророки", 28, 39),
    section("Евангелия", 40, 43),
    section("История церкви", 44, 44),
    section("Послания Павла", 45, 58),
    section("Соборные послания", 59, 65),
    section("Пророчество", 66, 66),
];

pub fn section_of(book: u32) -> Option<&'static Section> {
    SECTIONS
        .iter()
        .find(|section| (section.start..=section.end).contains(&book))
}

pub fn book_name(book: u32) -> Option<&'static str> {
    let index = usize::try_from(book).ok()?.checked_sub(1)?;
    BIBLE_BOOKS.get(index).copied()
}

fn aliases_for(lowercase_name: &str) -> &'static [&'static str] {
    BOOK_ALIASES
        .iter()
        .find(|(name, _)| *name == lowercase_name)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// Resolves a lowercased book name or alias to its 1-indexed number.
///
/// Books are tried in canonical order and the first exact match wins.
pub fn lookup_book(name: &str) -> Option<u32> {
    BIBLE_BOOKS.iter().zip(1..).find_map(|(canonical, number)| {
        let canonical = canonical.to_lowercase();
        let matches = canonical == name || aliases_for(&canonical).contains(&name);
        matches.then_some(number)
    })
}

/// Human-readable locator, e.g. `От Иоанна 3:16`.
pub fn format_verse_ref(book: u32, chapter: u32, verse: u32) -> String {
    match book_name(book) {
        Some(name) => format!("{} {}:{}", name, chapter, verse),
        None => format!("Книга {} {}:{}", book, chapter, verse),
    }
}
