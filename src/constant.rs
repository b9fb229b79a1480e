/// names of values used in interactions
pub mod value {
    pub const WORD: &str = "word";
    pub const URL: &str = "url";
    pub const EXPIRES_IN_DAYS: &str = "expires_in_days";
    pub const CHANNEL: &str = "channel";
}

/// names of the built-in slash commands
pub mod commands {
    pub const BALANCE: &str = "balance";
    pub const MEMBER_COUNT: &str = "membercount";
    pub const MEME: &str = "meme";
    pub const PING: &str = "ping";
    pub const GUILD_JOIN: &str = "guild-join";
    pub const SPELLCHECK: &str = "spellcheck";
    pub const SHORTEN: &str = "shorten";
    pub const VOICE_DELETE: &str = "voice-delete";
}

/// names of the built-in plugins
pub mod plugins {
    pub const CORE: &str = "core";
    pub const FUN: &str = "fun";
    pub const ECONOMY: &str = "economy";
    pub const LOGGING: &str = "logging";
    pub const VOICE: &str = "voice";
    pub const TICKETS: &str = "tickets";
    pub const LINKS: &str = "links";
    pub const DEVELOPER: &str = "developer";
}

/// custom ids of message components
pub mod components {
    pub const CLOSE_TICKET: &str = "close_ticket";
    pub const CLOSE_TICKET_CONFIRM: &str = "close_ticket_confirm";
    pub const CLOSE_TICKET_CANCEL: &str = "close_ticket_cancel";
}

/// The fixed pool `/meme` draws from.
pub const MEMES: [&str; 9] = [
    "https://i.imgflip.com/1bij.jpg",
    "https://i.imgflip.com/30b1gx.jpg",
    "https://i.imgflip.com/1ur9b0.jpg",
    "https://i.imgflip.com/1g8my4.jpg",
    "https://i.imgflip.com/22bdq6.jpg",
    "https://i.imgflip.com/24y43o.jpg",
    "https://i.imgflip.com/9ehk.jpg",
    "https://i.imgflip.com/1ihzfe.jpg",
    "https://i.imgflip.com/26am.jpg",
];

/// Placeholder shown in deletion logs when the message was never cached.
pub const UNCACHED_CONTENT: &str = "*Content was not cached.*";
