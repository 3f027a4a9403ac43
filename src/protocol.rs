use serde::Serialize;

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

/// Returned by endpoints that create a row.
#[derive(Default, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub err: String,
    pub id: u64,
}

impl CreatedResponse {
    pub fn ok(id: u64) -> Self {
        Self {
            success: true,
            err: "".to_string(),
            id,
        }
    }
}

/// Returned by endpoints that only report what happened.
#[derive(Default, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub err: String,
    pub message: String,
}

impl MessageResponse {
    pub fn ok<S: ToString>(message: S) -> Self {
        Self {
            success: true,
            err: "".to_string(),
            message: message.to_string(),
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
    CreatedResponse,
    MessageResponse,
}
