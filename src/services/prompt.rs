use crate::models::{ImagePart, InferenceRequest, UploadedImage};

/// Instruction sent ahead of every meal photo.
pub const FIXED_PROMPT: &str = "\
You are an expert nutritionist. Look at the food items in the image and calculate the total calories.
Also, provide a detailed breakdown of each food item with the calorie count in the format below:

1. Item 1 - no. of calories
2. Item 2 - no. of calories
----
Total calories: X
";

/// Combine the fixed instruction, the photo and the user's note into one request.
pub fn assemble<'a>(image: &'a UploadedImage, context: &'a str) -> InferenceRequest<'a> {
    InferenceRequest {
        prompt: FIXED_PROMPT,
        images: vec![ImagePart {
            media_type: image.media_type,
            data: &image.bytes,
        }],
        context,
    }
}
