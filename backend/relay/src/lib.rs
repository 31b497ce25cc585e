pub mod mattermost;

pub use mattermost::MattermostRelay;
