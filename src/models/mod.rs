use std::path::Path;

/// Image formats accepted by the upload form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMediaType {
    Jpeg,
    Png,
}

impl std::fmt::Display for ImageMediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_mime())
    }
}

impl ImageMediaType {
    pub fn as_mime(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Png => "image/png",
        }
    }

    /// Resolve a declared content type such as `image/png; charset=binary`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();

        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(ImageMediaType::Jpeg),
            "image/png" => Some(ImageMediaType::Png),
            _ => None,
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_lowercase();

        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageMediaType::Jpeg),
            "png" => Some(ImageMediaType::Png),
            _ => None,
        }
    }
}

/// A meal photo exactly as the browser sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub media_type: ImageMediaType,
    pub bytes: Vec<u8>,
}

/// Everything one press of the submit button carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MealSubmission {
    pub context: String, // empty means "no additional context"
    pub image: Option<UploadedImage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePart<'a> {
    pub media_type: ImageMediaType,
    pub data: &'a [u8],
}

/// Prompt, image and user text for a single model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest<'a> {
    pub prompt: &'static str,
    pub images: Vec<ImagePart<'a>>,
    pub context: &'a str,
}

/// How a submission ended, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    MissingImage,
    Success(String),
    Failed(String),
}
