use super::records::{
    BundleControl, BundleHeader, CashLetterControl, CashLetterHeader, CheckDetail, FileControl,
    FileHeader, ImageViewData, ImageViewDetail, ReturnDetail,
};

#[derive(Debug, Clone)]
pub struct X9File {
    pub header: FileHeader,
    pub cash_letters: Vec<CashLetter>,
    pub control: FileControl,
}

#[derive(Debug, Clone)]
pub struct CashLetter {
    pub header: CashLetterHeader,
    pub bundles: Vec<Bundle>,
    pub control: CashLetterControl,
}

#[derive(Debug, Clone)]
pub struct Bundle {
    pub header: BundleHeader,
    pub checks: Vec<Check>,
    pub returns: Vec<ReturnItem>,
    pub control: BundleControl,
}

#[derive(Debug, Clone)]
pub struct Check {
    pub detail: CheckDetail,
    pub addenda: usize,
    pub image_views: Vec<ImageView>,
}

#[derive(Debug, Clone)]
pub struct ReturnItem {
    pub detail: ReturnDetail,
    pub addenda: usize,
    pub image_views: Vec<ImageView>,
}

/// A type 50 record and the type 52 record that follows it, if any.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub detail: ImageViewDetail,
    pub data: Option<ImageViewData>,
}

impl X9File {
    pub fn item_count(&self) -> u64 {
        self.cash_letters.iter().map(CashLetter::item_count).sum()
    }

    pub fn total_amount(&self) -> u64 {
        self.cash_letters.iter().map(CashLetter::total_amount).sum()
    }

    pub fn check_count(&self) -> usize {
        self.cash_letters
            .iter()
            .flat_map(|cl| &cl.bundles)
            .map(|b| b.checks.len())
            .sum()
    }
}

impl CashLetter {
    pub fn item_count(&self) -> u64 {
        self.bundles.iter().map(Bundle::item_count).sum()
    }

    pub fn total_amount(&self) -> u64 {
        self.bundles.iter().map(Bundle::total_amount).sum()
    }

    pub fn image_count(&self) -> u64 {
        self.bundles.iter().map(Bundle::image_count).sum()
    }
}

impl Bundle {
    pub fn item_count(&self) -> u64 {
        (self.checks.len() + self.returns.len()) as u64
    }

    pub fn total_amount(&self) -> u64 {
        let checks: u64 = self.checks.iter().map(|c| c.detail.item_amount).sum();
        let returns: u64 = self.returns.iter().map(|r| r.detail.item_amount).sum();
        checks + returns
    }

    /// Number of image view detail (type 50) records in the bundle.
    pub fn image_count(&self) -> u64 {
        let checks: usize = self.checks.iter().map(|c| c.image_views.len()).sum();
        let returns: usize = self.returns.iter().map(|r| r.image_views.len()).sum();
        (checks + returns) as u64
    }
}

impl Check {
    /// Image payloads in record order; views without a type 52 record are skipped.
    pub fn images(&self) -> impl Iterator<Item = &[u8]> {
        self.image_views
            .iter()
            .filter_map(|view| view.data.as_ref())
            .map(|data| data.image_data.as_slice())
    }

    pub fn into_images(self) -> Vec<Vec<u8>> {
        self.image_views
            .into_iter()
            .filter_map(|view| view.data)
            .map(|data| data.image_data)
            .collect()
    }
}
