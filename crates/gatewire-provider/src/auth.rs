use wreq::RequestBuilder;

/// Injects the credential into the request per `Provider.auth_method`. This
/// is the only system-owned invariant on the upstream wire: everything else
/// about the request shape is provider-specific.
pub fn inject(
    builder: RequestBuilder,
    auth_method: &str,
    auth_header: Option<&str>,
    plaintext_key: &str,
) -> RequestBuilder {
    match auth_method {
        "header" => {
            let header_name = auth_header.unwrap_or("Authorization");
            builder.header(header_name, plaintext_key)
        }
        // "bearer" and "oauth" both present as a bearer token once the
        // plaintext is resolved from the vault; token refresh is out of
        // scope here.
        _ => builder.header("Authorization", format!("Bearer {plaintext_key}")),
    }
}
