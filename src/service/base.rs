/// Callable unit behind factories and constructors.
///
/// Boxed services are cloned before each call, so `call` can take `&mut self`
/// without the caller holding a lock on shared state.
pub(crate) trait Service<Request> {
    type Response;
    type Error;

    fn call(&mut self, request: Request) -> Result<Self::Response, Self::Error>;
}
