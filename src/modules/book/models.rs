use serde::{Deserialize, Serialize};

/// A persisted book record.
///
/// Serializes to exactly `{id, title, author, description, price}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Store-assigned identifier, never reused
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
}

/// Inbound body of `POST /book/add`.
///
/// Every field is optional at the wire level so that absent keys can be
/// reported together instead of failing on the first one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInput>,
}

/// Price as received: a JSON number, or a string holding one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    fn to_price(&self) -> Option<f64> {
        let price = match self {
            PriceInput::Number(price) => *price,
            PriceInput::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        price.is_finite().then_some(price)
    }
}

/// A create request that passed validation; every field is present and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldProblem {
    Required,
    Empty,
    Invalid,
}

/// One rejected field of a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: FieldProblem,
}

impl FieldError {
    fn new(field: &'static str, error: FieldProblem) -> Self {
        Self { field, error }
    }
}

impl CreateBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            description: Some(description.into()),
            price: Some(PriceInput::Number(price)),
        }
    }

    /// Check presence and shape of every field, collecting all failures.
    pub fn validate(self) -> Result<NewBook, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = required_text("title", self.title, &mut errors);
        let author = required_text("author", self.author, &mut errors);
        let description = required_text("description", self.description, &mut errors);
        let price = match self.price {
            None => {
                errors.push(FieldError::new("price", FieldProblem::Required));
                None
            }
            Some(input) => {
                let price = input.to_price();
                if price.is_none() {
                    errors.push(FieldError::new("price", FieldProblem::Invalid));
                }
                price
            }
        };

        match (title, author, description, price) {
            (Some(title), Some(author), Some(description), Some(price)) if errors.is_empty() => {
                Ok(NewBook {
                    title,
                    author,
                    description,
                    price,
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(
    field: &'static str,
    value: Option<String>,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError::new(field, FieldProblem::Required));
            None
        }
        Some(text) if text.trim().is_empty() => {
            errors.push(FieldError::new(field, FieldProblem::Empty));
            None
        }
        Some(text) => Some(text),
    }
}

/// The non-id fields of a stored book, as a create request would carry them.
impl From<&Book> for CreateBook {
    fn from(book: &Book) -> Self {
        CreateBook::new(
            book.title.clone(),
            book.author.clone(),
            book.description.clone(),
            book.price,
        )
    }
}
