//! Joke of the day

use rand::Rng;
use rand::seq::IndexedRandom;

/// Built-in pool; question and punchline separated by a line break
pub const BUILTIN_JOKES: [&str; 12] = [
    "Why do programmers prefer dark mode?\nBecause light attracts bugs!",
    "Doctor, I think I'm invisible.\nWho said that?",
    "Why can't a nose be 12 inches long?\nBecause then it would be a foot!",
    "How do trees get online?\nThey just log in!",
    "Why did the computer wear a sweater?\nBecause it had Windows open!",
    "What does a chemist say on finding two helium atoms?\nHeHe!",
    "I've been on a diet for two weeks.\nSo far I've lost fourteen days!",
    "What do you call a dog that does magic?\nA Labracadabrador!",
    "Why don't scientists trust atoms?\nBecause they make up everything!",
    "What did the Buddhist say to the hot dog vendor?\nMake me one with everything.",
    "What do you call a bear with no teeth?\nA gummy bear!",
    "Why did the scarecrow win an award?\nHe was outstanding in his field!",
];

/// Pick one joke from `pool`, or from the built-in pool when `pool` is empty
pub fn pick<R: Rng + ?Sized>(pool: &[String], rng: &mut R) -> String {
    let configured: Vec<&str> = pool.iter().map(|j| j.trim()).filter(|j| !j.is_empty()).collect();
    let candidates: &[&str] = if configured.is_empty() { &BUILTIN_JOKES } else { &configured };
    candidates.choose(rng).copied().unwrap_or(BUILTIN_JOKES[0]).to_string()
}
