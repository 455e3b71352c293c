//! Rule-based verb lemmatizer.
//!
//! Irregular forms are looked up in a fixed table. Everything else goes through
//! WordNet-style suffix detachment, and a candidate is only accepted when it is a
//! known base form. Unknown words are returned unchanged, so the mapping is total
//! and every output is a fixed point.

use crate::constants::DEFAULT_CUSTOM_LEXICON;
use crate::pipeline::processing::sentiment::lexicon::BASE_VALENCES;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("ate", "eat"),
    ("eaten", "eat"),
    ("became", "become"),
    ("began", "begin"),
    ("begun", "begin"),
    ("bled", "bleed"),
    ("bought", "buy"),
    ("broke", "break"),
    ("broken", "break"),
    ("brought", "bring"),
    ("built", "build"),
    ("came", "come"),
    ("caught", "catch"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("done", "do"),
    ("drew", "draw"),
    ("drawn", "draw"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("dying", "die"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("felt", "feel"),
    ("fled", "flee"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("fought", "fight"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("forgave", "forgive"),
    ("forgiven", "forgive"),
    ("found", "find"),
    ("froze", "freeze"),
    ("frozen", "freeze"),
    ("gave", "give"),
    ("given", "give"),
    ("got", "get"),
    ("gotten", "get"),
    ("gone", "go"),
    ("went", "go"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("heard", "hear"),
    ("held", "hold"),
    ("hid", "hide"),
    ("hidden", "hide"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("led", "lead"),
    ("left", "leave"),
    ("lost", "lose"),
    ("lying", "lie"),
    ("made", "make"),
    ("meant", "mean"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("rang", "ring"),
    ("rose", "rise"),
    ("risen", "rise"),
    ("said", "say"),
    ("sang", "sing"),
    ("sung", "sing"),
    ("sat", "sit"),
    ("saw", "see"),
    ("seen", "see"),
    ("sent", "send"),
    ("shook", "shake"),
    ("shaken", "shake"),
    ("shot", "shoot"),
    ("slept", "sleep"),
    ("sold", "sell"),
    ("sought", "seek"),
    ("spent", "spend"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("stole", "steal"),
    ("stolen", "steal"),
    ("stood", "stand"),
    ("struck", "strike"),
    ("swore", "swear"),
    ("sworn", "swear"),
    ("taught", "teach"),
    ("thought", "think"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("told", "tell"),
    ("took", "take"),
    ("taken", "take"),
    ("tore", "tear"),
    ("torn", "tear"),
    ("understood", "understand"),
    ("woke", "wake"),
    ("woken", "wake"),
    ("won", "win"),
    ("wore", "wear"),
    ("worn", "wear"),
    ("wrote", "write"),
    ("written", "write"),
];

/// Base forms the suffix rules may produce
const BASE_VERBS: &[&str] = &[
    "accept", "accuse", "achieve", "act", "add", "agree", "aim", "allow", "announce", "answer",
    "appear", "appreciate", "argue", "arrest", "arrive", "ask", "attack", "attend", "avoid",
    "ban", "beat", "become", "begin", "believe", "belong", "blame", "bleed", "block", "bomb",
    "break", "bring", "build", "burn", "buy", "call", "capture", "care", "carry", "catch",
    "cause", "celebrate", "change", "choose", "claim", "close", "collapse", "come", "comment",
    "condemn", "consider", "continue", "cost", "count", "cover", "create", "criticize", "cry",
    "cut", "damage", "dance", "decide", "declare", "defend", "deliver", "demand", "deny",
    "describe", "destroy", "detain", "develop", "die", "disagree", "discover", "displace",
    "divide", "do", "draw", "dream", "drink", "drive", "drop", "eat", "elect", "end", "enjoy",
    "enter", "escape", "evacuate", "expect", "explain", "face", "fail", "fall", "fear",
    "feed", "feel", "fight", "fill", "find", "finish", "fix", "flee", "fly", "follow",
    "force", "forget", "forgive", "freeze", "get", "give", "go", "govern", "grieve", "grow",
    "happen", "hate", "heal", "hear", "help", "hide", "hit", "hold", "hope", "hurt",
    "improve", "include", "increase", "injure", "invade", "invite", "join", "keep", "kill",
    "know", "laugh", "lead", "learn", "leave", "let", "lie", "like", "listen", "live",
    "look", "lose", "love", "make", "mean", "meet", "miss", "mourn", "move", "need",
    "negotiate", "occupy", "offer", "open", "pass", "pay", "permit", "photograph", "plan",
    "play", "post", "pray", "praise", "prefer", "prepare", "protect", "protest", "prove",
    "provide", "pull", "push", "put", "reach", "read", "receive", "recover", "reduce",
    "refuse", "reject", "release", "remain", "remember", "report", "rescue", "rest",
    "return", "rebuild", "ring", "rise", "rule", "run", "save", "say", "search", "see",
    "seek", "seem", "sell", "send", "serve", "set", "shake", "share", "shell", "shoot",
    "show", "sing", "sit", "sleep", "smile", "speak", "spend", "stand", "starve", "start",
    "stay", "steal", "stop", "strike", "struggle", "succeed", "suffer", "support",
    "survive", "swear", "take", "talk", "teach", "tear", "tell", "thank", "think",
    "threaten", "throw", "travel", "try", "turn", "understand", "unite", "use", "visit",
    "vote", "wait", "wake", "walk", "want", "warn", "watch", "wear", "win", "wish",
    "work", "worry", "wound", "write",
];

/// (suffix, replacement) applied in order; first known candidate wins
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| IRREGULAR_VERBS.iter().copied().collect());

static KNOWN: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    BASE_VERBS
        .iter()
        .copied()
        .chain(BASE_VALENCES.iter().map(|(word, _)| *word))
        .chain(DEFAULT_CUSTOM_LEXICON.iter().map(|(word, _)| *word))
        .chain(IRREGULAR_VERBS.iter().map(|(_, base)| *base))
        .filter(|word| !IRREGULAR.contains_key(word))
        .collect()
});

/// Reduce an inflected token to its base form.
pub fn lemmatize(token: &str) -> String {
    if let Some(base) = IRREGULAR.get(token) {
        return (*base).to_string();
    }
    if KNOWN.contains(token) {
        return token.to_string();
    }

    for (suffix, replacement) in SUFFIX_RULES {
        let Some(stem) = token.strip_suffix(suffix) else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }
        let candidate = format!("{stem}{replacement}");
        if KNOWN.contains(candidate.as_str()) {
            return candidate;
        }
        // stopped -> stopp -> stop
        if replacement.is_empty() && (*suffix == "ed" || *suffix == "ing") {
            if let Some(undoubled) = undouble(stem) {
                if KNOWN.contains(undoubled) {
                    return undoubled.to_string();
                }
            }
        }
    }

    token.to_string()
}

fn undouble(stem: &str) -> Option<&str> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n < 3 {
        return None;
    }
    let last = bytes[n - 1];
    if last == bytes[n - 2] && last.is_ascii_alphabetic() && !b"aeiou".contains(&last) {
        Some(&stem[..n - 1])
    } else {
        None
    }
}
