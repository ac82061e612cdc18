pub mod model_session;
