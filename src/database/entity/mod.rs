pub mod profile;
pub mod short_url;
pub mod voice_channel;
