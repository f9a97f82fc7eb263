use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    ProductDetail { slug: String },
    ProductListing,
    Checkout,
}

impl Route {
    pub fn product(slug: impl Into<String>) -> Self {
        Self::ProductDetail { slug: slug.into() }
    }

    pub fn path(&self) -> String {
        match self {
            Self::ProductDetail { slug } => format!("/products/{slug}"),
            Self::ProductListing => "/products".to_string(),
            Self::Checkout => "/checkout".to_string(),
        }
    }

    /// Absolute URL of this route on the storefront at `base`.
    pub fn resolve(&self, base: &Url) -> Result<Url, url::ParseError> {
        match self {
            Self::ProductDetail { slug } => {
                let mut url = base.join("/products/")?;
                url.path_segments_mut()
                    .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                    .pop_if_empty()
                    .push(slug);
                Ok(url)
            }
            _ => base.join(&self.path()),
        }
    }
}
