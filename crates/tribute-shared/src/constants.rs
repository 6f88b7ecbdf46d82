/// Local storage key holding the device identity
pub const DEVICE_ID_KEY: &str = "deviceId";

/// Local storage key holding the JSON array of liked story ids
pub const LIKED_STORIES_KEY: &str = "likedStories";

/// Prefix of generated device identities
pub const DEVICE_ID_PREFIX: &str = "device";

/// Remote tables
pub const TABLE_MEMORIALS: &str = "memorials";
pub const TABLE_PHOTOS: &str = "photos";
pub const TABLE_VIDEOS: &str = "videos";
pub const TABLE_STORIES: &str = "stories";
pub const TABLE_STORY_LIKES: &str = "story_likes";
pub const TABLE_STORY_COMMENTS: &str = "story_comments";

/// Default object storage bucket for uploaded images
pub const DEFAULT_MEDIA_BUCKET: &str = "media";

/// Default bound on a single backend call, in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Maximum slug length in characters
pub const MAX_SLUG_LEN: usize = 50;

/// Alt text used when a photo is added without one
pub const DEFAULT_PHOTO_ALT: &str = "Foto kenangan";

/// Title used when a video is added without one
pub const DEFAULT_VIDEO_TITLE: &str = "Video kenangan";
