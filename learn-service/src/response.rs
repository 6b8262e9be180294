use serde::Serialize;

/// `{ "data": T }` envelope around every successful response.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        DataResponse { data }
    }
}
