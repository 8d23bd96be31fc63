use chrono::{Datelike, NaiveDate};

/// Curated rotation; one topic per day of the year.
pub const MYSTERY_TOPICS: [&str; 22] = [
    "The Legend of the White Snake (Bai Suzhen)",
    "The Terracotta Army's Cursed Origins",
    "The Hanging Coffins of the Bo People",
    "The Ghost City of Fengdu",
    "The Monster of Lake Tianchi",
    "The 9,999 Rooms of the Forbidden City",
    "The Weeping of Lady Meng Jiang at the Great Wall",
    "The Fox Spirits (Huli Jing) of the North",
    "The Mystery of the Lop Nur 'Wandering Lake'",
    "The Guizhou Flying Train Incident",
    "The Legend of Nian and the New Year",
    "The Hopping Vampires (Jiangshi) Folklore",
    "The Butterfly Lovers (Liang Zhu)",
    "The Moon Goddess Chang'e and the Elixir",
    "The Old Man Under the Moon (Yue Lao)",
    "The Peach Blossom Spring (Shangri-La)",
    "The Ancient Sanxingdui Civilization Masks",
    "The Mogao Caves of Dunhuang",
    "The Legend of Hou Yi the Sun Shooter",
    "The Cowherd and the Weaver Girl (Qixi)",
    "The Dragon King of the East Sea",
    "The Eight Immortals Crossing the Sea",
];

/// Index into `MYSTERY_TOPICS` from the 1-based day of the year.
pub fn topic_index(date: NaiveDate) -> usize {
    date.ordinal() as usize % MYSTERY_TOPICS.len()
}

pub fn topic_for(date: NaiveDate) -> &'static str {
    MYSTERY_TOPICS[topic_index(date)]
}
