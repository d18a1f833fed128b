/// Per-node decision returned by a [`TreeFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeVisibility {
    /// Hide the node and its whole subtree.
    Hidden,
    /// Show the node only if some descendant ends up visible.
    Recurse,
    /// Show the node; children are evaluated on their own.
    Visible,
    /// Show the node and every descendant, whatever their own verdict.
    Tree,
}

/// Capability deciding the visibility of an element.
pub trait TreeFilter<T> {
    fn evaluate(&self, element: &T) -> TreeVisibility;
}

impl<T, F> TreeFilter<T> for F
where
    F: Fn(&T) -> TreeVisibility,
{
    fn evaluate(&self, element: &T) -> TreeVisibility {
        self(element)
    }
}

/// Capability mapping an element to a stable external key.
pub trait IdentityProvider<T> {
    fn get_id(&self, element: &T) -> String;
}

impl<T, F> IdentityProvider<T> for F
where
    F: Fn(&T) -> String,
{
    fn get_id(&self, element: &T) -> String {
        self(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_filters() {
        let filter = |s: &&str| {
            if s.contains("AMZN") {
                TreeVisibility::Visible
            } else {
                TreeVisibility::Recurse
            }
        };
        assert_eq!(filter.evaluate(&"AMZN"), TreeVisibility::Visible);
        assert_eq!(filter.evaluate(&"F"), TreeVisibility::Recurse);
    }

    #[test]
    fn closures_are_identity_providers() {
        let provider = |pair: &(u32, &str)| pair.0.to_string();
        assert_eq!(provider.get_id(&(7, "JAN")), "7");
    }
}
