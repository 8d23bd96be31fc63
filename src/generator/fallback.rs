use chrono::NaiveDate;

use crate::session::puzzle::{DailyPuzzle, Difficulty, PuzzleOption, Question};

const STORY: &str = "Long ago, in ancient China, there lived a terrifying beast named Nian. \
It had the head of a lion and the body of a bull. Every year, on the first day of the Lunar \
New Year, Nian would come down from the mountains to devour livestock, crops, and even \
villagers, especially children. The people lived in fear until an old wise man visited the \
village. He told them that Nian was afraid of three things: the color red, fire, and loud \
noises. When Nian arrived that night, the villagers were ready. They hung red lanterns and \
scrolls on their doors and windows, lit firecrackers, and beat drums. The beast, terrified by \
the commotion and the sea of red, fled back into the mountains, never to return. This is why, \
to this day, people celebrate Chinese New Year with red decorations and firecrackers.";

fn question(
    id: &str,
    difficulty: Difficulty,
    text: &str,
    options: [&str; 4],
    correct: &str,
) -> Question {
    Question {
        id: id.to_string(),
        difficulty,
        text: text.to_string(),
        options: ["A", "B", "C", "D"]
            .iter()
            .zip(options)
            .map(|(id, text)| PuzzleOption {
                id: id.to_string(),
                text: text.to_string(),
            })
            .collect(),
        correct_option_id: correct.to_string(),
    }
}

/// The puzzle served whenever generation fails. Always valid, so the game
/// stays playable without the provider.
pub fn fallback_puzzle(date: NaiveDate) -> DailyPuzzle {
    DailyPuzzle {
        id: date,
        title: "The Legend of the Nian Monster".to_string(),
        lunar_date: "Year of the Dragon, 1st Month, 1st Day".to_string(),
        story: STORY.to_string(),
        questions: [
            question(
                "q1",
                Difficulty::Easy,
                "What three things is the Nian monster afraid of?",
                [
                    "Water, Wind, and Earth",
                    "Red color, Fire, and Loud noises",
                    "Swords, Shields, and Arrows",
                    "Gold, Silver, and Jade",
                ],
                "B",
            ),
            question(
                "q2",
                Difficulty::Medium,
                "Based on the story, when does the Nian monster attack?",
                [
                    "During the Mid-Autumn Festival",
                    "On the first day of the Lunar New Year",
                    "Every full moon",
                    "During the Winter Solstice",
                ],
                "B",
            ),
            question(
                "q3",
                Difficulty::Hard,
                "What combination of animal features does the Nian have in this story?",
                [
                    "Head of a dragon, body of a snake",
                    "Head of a tiger, body of a bear",
                    "Head of a lion, body of a bull",
                    "Head of a dog, body of a wolf",
                ],
                "C",
            ),
        ],
    }
}
