// Services module
// Engine components behind the command surface

pub mod github;
pub mod playback;
pub mod subtitles;
