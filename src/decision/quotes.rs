//! Loading-screen quotes and facts, picked by personality and role.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::preferences::PersonalityMode;

use super::model::Role;

const STRICT: &[&str] = &[
    "Stop staring at this screen and go do something.",
    "Your future self is watching you procrastinate.",
    "Excuses don't burn calories or write code.",
    "Discipline is choosing what you want most over what you want now.",
    "If you are reading this, you are wasting time.",
];

const ZEN: &[&str] = &[
    "Breathe. You are exactly where you need to be.",
    "Productivity is not about doing more, but being present.",
    "A cluttered mind creates a cluttered life.",
    "Rest is not idleness, it's fuel.",
    "Flow like water, not like a stone.",
];

const BALANCED: &[&str] = &[
    "Work hard, nap hard.",
    "Small progress is still progress.",
    "Don't let perfect be the enemy of good.",
    "Focus on one thing at a time.",
    "You got this. Just start.",
];

const STUDENT: &[&str] = &[
    "Due tomorrow? Do it today (just kidding, do it now).",
    "C's get degrees, but A's get paid.",
    "Hydrate. Your brain is a wet sponge.",
    "Study tip: The Pomodoro technique actually works.",
    "Sleep is the best study aid.",
];

pub const FACTS: &[&str] = &[
    "Did you know? Decision fatigue is real. That's why I'm here.",
    "Tip: Your brain works best in 90-minute ultradian cycles.",
    "Fact: Multitasking lowers your IQ temporarily by 15 points.",
    "Hydration Hack: Drinking water immediately upon waking boosts alertness.",
    "Tip: Write down your tasks the night before to sleep better.",
];

/// Quotes matching a personality.
pub fn quotes_for(mode: PersonalityMode) -> &'static [&'static str] {
    match mode {
        PersonalityMode::Strict => STRICT,
        PersonalityMode::Zen => ZEN,
        PersonalityMode::Balanced => BALANCED,
    }
}

/// Pick a line to show while a request is in flight.
///
/// Students sometimes get a student quote; otherwise the personality pool
/// or, one time in four, a fact.
pub fn pick_quote<R: Rng + ?Sized>(mode: PersonalityMode, role: Role, rng: &mut R) -> &'static str {
    let pool = match rng.gen_range(0..4) {
        0 => FACTS,
        1 if role == Role::Student => STUDENT,
        _ => quotes_for(mode),
    };
    pool.choose(rng).copied().unwrap_or("You got this. Just start.")
}
