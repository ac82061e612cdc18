pub mod model_resolver;
pub mod onnx_blazeface_session;
pub mod onnx_facemesh_session;
pub mod onnx_session_loader;
