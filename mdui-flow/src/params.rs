/// Read-only view over the parameters of the request driving the flow.
pub trait RequestParameters: Sync {
    fn parameter(&self, name: &str) -> Option<&str>;
}

impl RequestParameters for [(String, String)] {
    // first occurrence wins, like a servlet request
    fn parameter(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl RequestParameters for Vec<(String, String)> {
    fn parameter(&self, name: &str) -> Option<&str> {
        self.as_slice().parameter(name)
    }
}
