use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("a command named `{0}` is already registered")]
    DuplicateCommand(String),
    #[error("a component with id `{0}` is already registered")]
    DuplicateComponent(String),
    #[error("a plugin named `{0}` is already registered")]
    DuplicatePlugin(String),
}

#[derive(Error, Debug)]
pub enum VoiceChannelError {
    /// The channel has no ownership record, so it was not created by the bot.
    #[error("this channel is not part of the voice channel system")]
    NotPartOfSystem,
    #[error("only the channel owner or an administrator can delete this channel")]
    PermissionDenied,
    #[error("failed to delete the channel: {0}")]
    Channel(anyhow::Error),
    #[error("voice channel store error: {0}")]
    Store(anyhow::Error),
}
