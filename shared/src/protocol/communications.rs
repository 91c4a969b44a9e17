use super::{ApiRequest, HttpMethod, json_body};
use crate::communication::{
    CommunicationRecord, CommunicationStats, InitiateCall, SendEmail, SendMessage,
};
use crate::page::{ListQuery, Paged};
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, Default)]
pub struct GetCommunicationStats;

impl ApiRequest for GetCommunicationStats {
    type Response = CommunicationStats;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/communications/stats".to_string()
    }
}

/// Paged communication history.
#[derive(Debug, Clone, Default)]
pub struct ListCommunications {
    pub query: ListQuery,
}

impl ApiRequest for ListCommunications {
    type Response = Paged<CommunicationRecord>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/communications/history".to_string()
    }

    fn query(&self) -> Option<String> {
        self.query.encode()
    }
}

/// Body-carrying outbound actions share the same shape.
macro_rules! outbound {
    ($($ty:ty => $path:literal),* $(,)?) => {
        $(
            impl ApiRequest for $ty {
                type Response = CommunicationRecord;
                const METHOD: HttpMethod = HttpMethod::Post;

                fn path(&self) -> String {
                    $path.to_string()
                }

                fn body(&self) -> Result<Option<String>, serde_json::Error> {
                    json_body(self)
                }

                fn check_input(&self) -> Result<(), ValidationErrors> {
                    self.validate()
                }
            }
        )*
    };
}

outbound!(
    InitiateCall => "/communications/call",
    SendMessage => "/communications/message",
    SendEmail => "/communications/email",
);
