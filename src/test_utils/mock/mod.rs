mod mock_builder;

pub(crate) use mock_builder::*;
pub(crate) use stub_client::*;
