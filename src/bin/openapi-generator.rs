//! Print the OpenAPI document of the trivia buzzer API as JSON.

use trivia_buzzer_back::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() {
    let doc = ApiDoc::openapi();
    println!("{}", doc.to_pretty_json().unwrap());
}
