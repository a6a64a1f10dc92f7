//! Special mathematical functions.
//!
//! Numerical approximations of the functions with no closed form that the
//! distribution layer is built on: log-gamma, log-factorial, the error
//! function and its inverse, the regularized incomplete beta and gamma
//! functions, and the modified Bessel function of order zero.
//!
//! All functions are total over `f64`: out-of-domain input yields
//! `f64::NAN` rather than a panic.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_2_SQRT_PI, PI};

/// 1/√(2π) ≈ 0.3989422804014327
const FRAC_1_SQRT_2PI: f64 = 0.3989422804014326779399460599343818684758586311649;

/// ½ ln(2π)
const HALF_LN_2PI: f64 = 0.918_938_533_204_672_7;

// ============================================================================
// Gamma Function
// ============================================================================

/// Lanczos approximation of ln Γ(z).
///
/// For `z < 0.5` the reflection formula
/// `ln Γ(z) = ln π − ln sin(πz) − ln Γ(1−z)` keeps the result accurate
/// near the pole at zero.
///
/// Reference: Lanczos (1964), "A Precision Approximation of the Gamma
/// Function", *SIAM Journal on Numerical Analysis* 1(1).
///
/// # Accuracy
/// Relative error < 2 × 10⁻¹⁰ for z > 0.
///
/// # Returns
/// - `f64::NAN` for `z < 0` or NaN.
/// - `f64::INFINITY` at `z = 0`.
///
/// # Examples
/// ```
/// use u_probdist::special::ln_gamma;
/// // Γ(5) = 24
/// assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
/// assert!(ln_gamma(-1.5).is_nan());
/// ```
pub fn ln_gamma(z: f64) -> f64 {
    #[allow(clippy::excessive_precision)]
    const COEFFICIENTS: [f64; 9] = [
        0.99999999999980993,
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];
    const G: f64 = 7.0;

    if z.is_nan() || z < 0.0 {
        return f64::NAN;
    }
    if z == f64::INFINITY {
        return f64::INFINITY;
    }

    if z < 0.5 {
        return PI.ln() - (PI * z).sin().ln() - ln_gamma(1.0 - z);
    }

    let z = z - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS[1..].iter().enumerate() {
        sum += c / (z + i as f64 + 1.0);
    }

    let t = z + G + 0.5;
    HALF_LN_2PI + (z + 0.5) * t.ln() - t + sum.ln()
}

// ============================================================================
// Factorials and Binomial Coefficients
// ============================================================================

/// ln(n!) for n = 0..=254.
#[allow(clippy::excessive_precision)]
const LN_FACTORIAL_TABLE: [f64; 255] = [
    0.0, 0.0, 0.6931471805599453, 1.791759469228055,
    3.1780538303479458, 4.787491742782046, 6.579251212010101, 8.525161361065415,
    10.60460290274525, 12.801827480081469, 15.104412573075516, 17.502307845873887,
    19.987214495661885, 22.552163853123425, 25.19122118273868, 27.89927138384089,
    30.671860106080672, 33.50507345013689, 36.39544520803305, 39.339884187199495,
    42.335616460753485, 45.38013889847691, 48.47118135183523, 51.60667556776438,
    54.78472939811232, 58.00360522298052, 61.261701761002, 64.55753862700634,
    67.88974313718154, 71.25703896716801, 74.65823634883016, 78.0922235533153,
    81.55795945611504, 85.05446701758152, 88.58082754219768, 92.1361756036871,
    95.7196945421432, 99.33061245478743, 102.96819861451381, 106.63176026064346,
    110.32063971475739, 114.0342117814617, 117.77188139974507, 121.53308151543864,
    125.3172711493569, 129.12393363912722, 132.95257503561632, 136.80272263732635,
    140.67392364823425, 144.5657439463449, 148.47776695177302, 152.40959258449735,
    156.3608363030788, 160.3311282166309, 164.32011226319517, 168.32744544842765,
    172.3527971391628, 176.39584840699735, 180.45629141754378, 184.53382886144948,
    188.6281734236716, 192.7390472878449, 196.86618167289, 201.00931639928152,
    205.1681994826412, 209.34258675253685, 213.53224149456327, 217.73693411395422,
    221.95644181913033, 226.1905483237276, 230.43904356577696, 234.70172344281826,
    238.97838956183432, 243.2688490029827, 247.57291409618688, 251.8904022097232,
    256.22113555000954, 260.5649409718632, 264.9216497985528, 269.2910976510198,
    273.6731242856937, 278.0675734403661, 282.4742926876304, 286.893133295427,
    291.3239500942703, 295.76660135076065, 300.22094864701415, 304.6868567656687,
    309.1641935801469, 313.65282994987905, 318.1526396202093, 322.66349912672615,
    327.1852877037752, 331.7178871969285, 336.26118197919845, 340.815058870799,
    345.37940706226686, 349.95411804077025, 354.5390855194408, 359.1342053695754,
    363.73937555556347, 368.35449607240474, 372.979468885689, 377.61419787391867,
    382.25858877306, 386.91254912321756, 391.5759882173296, 396.24881705179155,
    400.93094827891576, 405.6222961611449, 410.32277652693733, 415.03230672824964,
    419.7508055995447, 424.4781934182571, 429.21439186665157, 433.9593239950148,
    438.71291418612117, 443.47508812091894, 448.2457727453846, 453.0248962384961,
    457.81238798127816, 462.6081785268749, 467.4121995716082, 472.2243839269806,
    477.04466549258564, 481.87297922988796, 486.7092611368394, 491.553448223298,
    496.40547848721764, 501.2652908915793, 506.1328253420349, 511.008022665236,
    515.8908245878224, 520.7811737160441, 525.679013515995, 530.5842882944335,
    535.4969431801695, 540.4169241059976, 545.3441777911548, 550.2786517242855,
    555.2202941468948, 560.169054037273, 565.1248810948744, 570.0877257251342,
    575.0575390247102, 580.0342727671308, 585.0178793888391, 590.0083119756179,
    595.005524249382, 600.0094705553274, 605.0201058494237, 610.0373856862386,
    615.0612662070849, 620.0917041284773, 625.128656730891, 630.1720818478102,
    635.2219378550598, 640.278183660408, 645.340778693435, 650.4096828956552,
    655.4848567108891, 660.5662610758735, 665.653857411106, 670.7476076119127,
    675.8474740397369, 680.9534195136374, 686.065407301994, 691.1834011144108,
    696.307365093814, 701.437263808737, 706.5730622457874, 711.7147258022899,
    716.8622202791034, 722.0155118736012, 727.1745671728158, 732.3393531467393,
    737.5098371417774, 742.6859868743512, 747.8677704246434, 753.055156230484,
    758.2481130813743, 763.4466101126402, 768.6506167997169, 773.8601029525583,
    779.0750387101673, 784.2953945352456, 789.5211412089589, 794.7522498258134,
    799.9886917886433, 805.230438803703, 810.4774628758636, 815.7297363039102,
    820.9872316759379, 826.2499218648428, 831.5177800239061, 836.7907795824699,
    842.0688942417004, 847.3520979704383, 852.6403650011329, 857.9336698258574,
    863.2319871924054, 868.5352921004645, 873.8435597978657, 879.1567657769075,
    884.4748857707517, 889.7978957498901, 895.1257719186798, 900.458490711945,
    905.7960287916464, 911.1383630436112, 916.4854705743287, 921.8373287078048,
    927.1939149824768, 932.5552071481862, 937.9211831632081, 943.2918211913357,
    948.6670995990199, 954.0469969525603, 959.4314920153495, 964.8205637451659,
    970.2141912915183, 975.6123539930361, 981.0150313749083, 986.4222031463684,
    991.8338491982234, 997.249949600428, 1002.6704845997001, 1008.0954346171816,
    1013.524780246136, 1018.9585022496902, 1024.3965815586134, 1029.8389992691352,
    1035.2857366408016, 1040.7367750943672, 1046.192096209725, 1051.6516817238692,
    1057.1155135288948, 1062.5835736700299, 1068.0558443437012, 1073.5323078956328,
    1079.0129468189748, 1084.4977437524653, 1089.9866814786221, 1095.4797429219627,
    1100.9769111472558, 1106.4781693578007, 1111.983500893733, 1117.492889230361,
    1123.006317976526, 1128.5237708729908, 1134.045231790853, 1139.5706847299848,
    1145.1001138174963, 1150.6335033062235, 1156.1708375732421,
];

/// Natural log of `n!`.
///
/// Exact table lookup for `n ≤ 254`; Stirling's series
/// `(x−½) ln x − x + ½ ln 2π + 1/(12x)` with `x = n+1` beyond that.
///
/// # Examples
/// ```
/// use u_probdist::special::ln_factorial;
/// assert_eq!(ln_factorial(0), 0.0);
/// assert!((ln_factorial(5) - 120.0_f64.ln()).abs() < 1e-14);
/// ```
pub fn ln_factorial(n: u64) -> f64 {
    if n < LN_FACTORIAL_TABLE.len() as u64 {
        return LN_FACTORIAL_TABLE[n as usize];
    }
    let x = n as f64 + 1.0;
    (x - 0.5) * x.ln() - x + HALF_LN_2PI + 1.0 / (12.0 * x)
}

/// Natural log of the binomial coefficient `C(n, k)`.
///
/// Returns `f64::NEG_INFINITY` when `k > n` (the coefficient is zero).
pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_factorial(n) - ln_factorial(n - k) - ln_factorial(k)
}

/// Log of the Beta function: `ln B(a, b) = ln Γ(a) + ln Γ(b) − ln Γ(a+b)`.
///
/// # Returns
/// - `f64::NAN` for negative arguments or when both are zero.
/// - `f64::INFINITY` when exactly one argument is zero.
///
/// # Examples
/// ```
/// use u_probdist::special::ln_beta;
/// // B(1,1) = 1, so ln B(1,1) = 0
/// assert!(ln_beta(1.0, 1.0).abs() < 1e-10);
/// ```
pub fn ln_beta(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() || a < 0.0 || b < 0.0 || (a == 0.0 && b == 0.0) {
        return f64::NAN;
    }
    if a == 0.0 || b == 0.0 {
        return f64::INFINITY;
    }
    ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b)
}

// ============================================================================
// Error Function
// ============================================================================

/// Complementary error function erfc(x) = 1 − erf(x).
///
/// # Algorithm
/// Product of rational factors due to Dia (2023), valid for `x ≥ 0`;
/// negative arguments use `erfc(−x) = 2 − erfc(x)`.
///
/// Reference: Dia (2023), "Approximate Incomplete Integrals, Application
/// to Complementary Error Function", SSRN 4487559.
///
/// # Accuracy
/// Relative error of order 10⁻¹⁶ for x ≥ 0.
///
/// # Examples
/// ```
/// use u_probdist::special::erfc;
/// assert!((erfc(2.0) - 0.004677734981047266).abs() < 1e-15);
/// assert_eq!(erfc(f64::INFINITY), 0.0);
/// ```
pub fn erfc(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let y = x.abs();
    // erfc underflows past ~26.6
    if y > 27.0 {
        return if x > 0.0 { 0.0 } else { 2.0 };
    }

    #[allow(clippy::excessive_precision)]
    const FACTORS: [(f64, f64, f64, f64); 5] = [
        (2.71078540045147805, 5.80755613130301624, 3.47954057099518960, 12.06166887286239555),
        (3.47469513777439592, 12.07402036406381411, 3.72068443960225092, 8.44319781003968454),
        (4.00561509202259545, 9.30596659485887898, 3.90225704029924078, 6.36161630953880464),
        (5.16722705817812584, 9.12661617673673262, 4.03296893109262491, 5.13578530585681539),
        (5.95908795446633271, 9.19435612886969243, 4.11240942957450885, 4.48640329523408675),
    ];

    let y2 = y * y;
    #[allow(clippy::excessive_precision)]
    let mut res = 0.56418958354775629 / (y + 2.06955023132914151);
    for &(n1, n0, d1, d0) in &FACTORS {
        res *= (y2 + n1 * y + n0) / (y2 + d1 * y + d0);
    }
    res *= (-y2).exp();

    if x < 0.0 {
        2.0 - res
    } else {
        res
    }
}

/// Error function erf(x) = (2/√π) ∫₀ˣ exp(−t²) dt.
///
/// Maclaurin series for `|x| < 0.5`, `1 − erfc(|x|)` otherwise, so the
/// function is exactly odd and `erf(0) = 0`.
///
/// # Examples
/// ```
/// use u_probdist::special::erf;
/// assert_eq!(erf(0.0), 0.0);
/// assert!((erf(1.0) - 0.8427007929497149).abs() < 1e-14);
/// ```
pub fn erf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x.abs() < 0.5 {
        // Σ (−1)ⁿ x^(2n+1) / (n! (2n+1))
        let x2 = x * x;
        let mut power = x;
        let mut sum = x;
        for n in 1..40 {
            let nf = n as f64;
            power *= -x2 / nf;
            let term = power / (2.0 * nf + 1.0);
            sum += term;
            if term.abs() <= sum.abs() * 1e-17 {
                break;
            }
        }
        return FRAC_2_SQRT_PI * sum;
    }
    let r = 1.0 - erfc(x.abs());
    if x < 0.0 {
        -r
    } else {
        r
    }
}

/// Inverse error function: returns `x` with `erf(x) = y`.
///
/// Computed as `Φ⁻¹((y+1)/2) / √2` using [`inverse_normal_cdf`].
///
/// # Returns
/// - `f64::NAN` for `y` outside `[−1, 1]` or NaN.
/// - `±∞` at `y = ±1`.
///
/// # Examples
/// ```
/// use u_probdist::special::{erf, erfinv};
/// assert_eq!(erfinv(0.0), 0.0);
/// let x = erfinv(0.5);
/// assert!((erf(x) - 0.5).abs() < 1e-14);
/// ```
pub fn erfinv(y: f64) -> f64 {
    if y.is_nan() || !(-1.0..=1.0).contains(&y) {
        return f64::NAN;
    }
    if y == 0.0 {
        return 0.0;
    }
    FRAC_1_SQRT_2 * inverse_normal_cdf(0.5 * (y + 1.0))
}

// ============================================================================
// Standard Normal
// ============================================================================

/// Standard normal CDF Φ(x) = ½ erfc(−x/√2).
///
/// # Examples
/// ```
/// use u_probdist::special::standard_normal_cdf;
/// assert!((standard_normal_cdf(0.0) - 0.5).abs() < 1e-15);
/// assert!((standard_normal_cdf(1.96) - 0.9750021048517795).abs() < 1e-13);
/// ```
pub fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// ln Φ(x), accurate deep in the lower tail where Φ underflows.
///
/// Below `x = −35` the asymptotic expansion
/// `ln φ(x) − ln(−x) + ln(1 − 1/x² + 3/x⁴ − 15/x⁶ + 105/x⁸)` is used.
pub fn ln_standard_normal_cdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x > 0.0 {
        return (-0.5 * erfc(x * FRAC_1_SQRT_2)).ln_1p();
    }
    if x >= -35.0 {
        return standard_normal_cdf(x).ln();
    }
    if x == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let z = 1.0 / (x * x);
    let series = 1.0 + z * (-1.0 + z * (3.0 + z * (-15.0 + z * 105.0)));
    -0.5 * x * x - HALF_LN_2PI - (-x).ln() + series.ln()
}

/// Standard normal PDF φ(x) = (1/√(2π)) exp(−x²/2).
pub fn standard_normal_pdf(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Inverse standard normal CDF (quantile function).
///
/// # Algorithm
/// Wichura's PPND7 rational approximation (about seven significant
/// figures), polished with two Newton steps on Φ. The residual is taken
/// from whichever tail is smaller so that extreme quantiles keep full
/// relative precision.
///
/// Reference: Wichura (1988), "Algorithm AS 241: The Percentage Points of
/// the Normal Distribution", *Applied Statistics* 37(3).
///
/// # Returns
/// - `f64::NAN` if `p` is outside `[0, 1]` or NaN.
/// - `f64::NEG_INFINITY` at `p = 0`, `f64::INFINITY` at `p = 1`.
///
/// # Examples
/// ```
/// use u_probdist::special::inverse_normal_cdf;
/// assert!(inverse_normal_cdf(0.5).abs() < 1e-15);
/// assert!((inverse_normal_cdf(0.975) - 1.959963984540054).abs() < 1e-12);
/// ```
pub fn inverse_normal_cdf(p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let mut z = ppnd7(p);
    for _ in 0..2 {
        let density = standard_normal_pdf(z);
        if density == 0.0 || !z.is_finite() {
            break;
        }
        let residual = if z <= 0.0 {
            standard_normal_cdf(z) - p
        } else {
            (1.0 - p) - 0.5 * erfc(z * FRAC_1_SQRT_2)
        };
        z -= residual / density;
    }
    z
}

/// Wichura's PPND7: standard normal quantile to about 1e-7.
fn ppnd7(p: f64) -> f64 {
    const SPLIT1: f64 = 0.425;
    const SPLIT2: f64 = 5.0;
    const CONST1: f64 = 0.180625;
    const CONST2: f64 = 1.6;

    // p close to 1/2
    const A: [f64; 4] = [3.3871327179, 5.0434271938e1, 1.5929113202e2, 5.9109374720e1];
    const B: [f64; 3] = [1.7895169469e1, 7.8757757664e1, 6.7187563600e1];
    // intermediate tails
    const C: [f64; 4] = [1.4234372777, 2.7568153900, 1.3067284816, 1.7023821103e-1];
    const D: [f64; 2] = [7.3700164250e-1, 1.2021132975e-1];
    // far tails
    const E: [f64; 4] = [6.6579051150, 3.0812263860, 4.2868294337e-1, 1.7337203997e-2];
    const F: [f64; 2] = [2.4197894225e-1, 1.2258202635e-2];

    let q = p - 0.5;
    if q.abs() <= SPLIT1 {
        let r = CONST1 - q * q;
        return q * (((A[3] * r + A[2]) * r + A[1]) * r + A[0])
            / (((B[2] * r + B[1]) * r + B[0]) * r + 1.0);
    }

    let tail = if q < 0.0 { p } else { 1.0 - p };
    let mut r = (-tail.ln()).sqrt();
    let z = if r <= SPLIT2 {
        r -= CONST2;
        (((C[3] * r + C[2]) * r + C[1]) * r + C[0]) / ((D[1] * r + D[0]) * r + 1.0)
    } else {
        r -= SPLIT2;
        (((E[3] * r + E[2]) * r + E[1]) * r + E[0]) / ((F[1] * r + F[0]) * r + 1.0)
    };

    if q < 0.0 {
        -z
    } else {
        z
    }
}

// ============================================================================
// Regularized Incomplete Beta Function
// ============================================================================

/// Regularized incomplete beta function I_x(a, b).
///
/// # Definition
/// ```text
/// I_x(a, b) = B(x; a, b) / B(a, b)
/// ```
///
/// # Algorithm
/// Continued fraction (Lentz's method) after the symmetry transform
/// `I_x(a,b) = 1 − I_{1−x}(b,a)` that puts `x` on the fast-converging side.
/// Special cases: `a = b = 1` returns `x`; `x ∈ {0, 1}` return the bounds;
/// `a = 0` is a point mass at 0 and `b = 0` a point mass at 1.
///
/// Reference: Press et al. (2007), *Numerical Recipes*, 3rd ed., §6.4.
///
/// # Returns
/// `f64::NAN` for `x` outside `[0, 1]`, negative shape parameters, or NaN.
///
/// # Examples
/// ```
/// use u_probdist::special::regularized_incomplete_beta;
/// assert_eq!(regularized_incomplete_beta(0.0, 2.0, 3.0), 0.0);
/// assert_eq!(regularized_incomplete_beta(1.0, 2.0, 3.0), 1.0);
/// assert_eq!(regularized_incomplete_beta(0.5, 1.0, 1.0), 0.5);
/// ```
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x.is_nan() || a.is_nan() || b.is_nan() || !(0.0..=1.0).contains(&x) || a < 0.0 || b < 0.0
    {
        return f64::NAN;
    }
    if a == 1.0 && b == 1.0 {
        return x;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }
    if a == 0.0 {
        return 1.0;
    }
    if b == 0.0 {
        return 0.0;
    }

    // I_x(a,b) = 1 - I_{1-x}(b,a)
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
    }

    let ln_prefix = a * x.ln() + b * (-x).ln_1p() - ln_beta(a, b);
    let cf = beta_cf(x, a, b);
    (ln_prefix.exp() / a) * cf
}

/// Continued fraction for the incomplete beta function (Lentz's algorithm).
fn beta_cf(x: f64, a: f64, b: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - (a + b) * x / (a + 1.0));
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m_f = m as f64;
        let num_even = m_f * (b - m_f) * x / ((a + 2.0 * m_f - 1.0) * (a + 2.0 * m_f));
        d = 1.0 / guard(1.0 + num_even * d);
        c = guard(1.0 + num_even / c);
        h *= d * c;

        let num_odd =
            -(a + m_f) * (a + b + m_f) * x / ((a + 2.0 * m_f) * (a + 2.0 * m_f + 1.0));
        d = 1.0 / guard(1.0 + num_odd * d);
        c = guard(1.0 + num_odd / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

// ============================================================================
// Incomplete Gamma Functions
// ============================================================================

/// Lower incomplete gamma function γ(s, x), or P(s, x) = γ(s, x)/Γ(s)
/// when `regularized` is set.
///
/// # Algorithm
/// Power series when `x ≤ 1.1` or `x ≤ s`; otherwise the complement of
/// [`gamma_inc_upper`], whose continued fraction converges fast there.
///
/// # Returns
/// `f64::NAN` for `x < 0`, `s ≤ 0`, or NaN input.
///
/// # Examples
/// ```
/// use u_probdist::special::gamma_inc_lower;
/// // P(1, x) = 1 − exp(−x)
/// let p = gamma_inc_lower(2.0, 1.0, true);
/// assert!((p - (1.0 - (-2.0_f64).exp())).abs() < 1e-14);
/// ```
pub fn gamma_inc_lower(x: f64, s: f64, regularized: bool) -> f64 {
    if x.is_nan() || s.is_nan() || x < 0.0 || s <= 0.0 {
        return f64::NAN;
    }
    let reg = if x == 0.0 {
        0.0
    } else if x == f64::INFINITY {
        1.0
    } else if x <= 1.1 || x <= s {
        gamma_series(x, s)
    } else {
        1.0 - gamma_cf(x, s)
    };
    scale(reg, s, regularized)
}

/// Upper incomplete gamma function Γ(s, x), or Q(s, x) = Γ(s, x)/Γ(s)
/// when `regularized` is set.
///
/// # Algorithm
/// Continued fraction when `x > 1.1` and `x > s`; otherwise the
/// complement of the series for [`gamma_inc_lower`].
///
/// # Returns
/// `f64::NAN` for `x < 0`, `s ≤ 0`, or NaN input.
pub fn gamma_inc_upper(x: f64, s: f64, regularized: bool) -> f64 {
    if x.is_nan() || s.is_nan() || x < 0.0 || s <= 0.0 {
        return f64::NAN;
    }
    let reg = if x == 0.0 {
        1.0
    } else if x == f64::INFINITY {
        0.0
    } else if x > 1.1 && x > s {
        gamma_cf(x, s)
    } else {
        1.0 - gamma_series(x, s)
    };
    scale(reg, s, regularized)
}

fn scale(reg: f64, s: f64, regularized: bool) -> f64 {
    if regularized {
        reg
    } else {
        reg * ln_gamma(s).exp()
    }
}

/// Series expansion for the regularized lower incomplete gamma.
fn gamma_series(x: f64, s: f64) -> f64 {
    const MAX_ITER: usize = 10_000;
    const EPS: f64 = 1e-15;

    let mut term = 1.0 / s;
    let mut sum = term;
    let mut ap = s;
    for _ in 0..MAX_ITER {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * EPS {
            break;
        }
    }
    sum * (-x + s * x.ln() - ln_gamma(s)).exp()
}

/// Continued fraction for the regularized upper incomplete gamma.
fn gamma_cf(x: f64, s: f64) -> f64 {
    const MAX_ITER: usize = 10_000;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let mut b = x + 1.0 - s;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITER {
        let an = -(i as f64) * (i as f64 - s);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h * (-x + s * x.ln() - ln_gamma(s)).exp()
}

// ============================================================================
// Modified Bessel Function I₀
// ============================================================================

/// Chebyshev coefficients for I₀ on [0, 8], argument `x/2 − 2`.
#[allow(clippy::excessive_precision)]
const BESSEL_I0_A: [f64; 30] = [
    -4.41534164647933937950e-18,
    3.33079451882223809783e-17,
    -2.43127984654795469359e-16,
    1.71539128555513303061e-15,
    -1.16853328779934516808e-14,
    7.67618549860493561688e-14,
    -4.85644678311192946090e-13,
    2.95505266312963983461e-12,
    -1.72682629144155570723e-11,
    9.67580903537323691224e-11,
    -5.18979560163526290666e-10,
    2.65982372468238665035e-9,
    -1.30002500998624804212e-8,
    6.04699502254191894932e-8,
    -2.67079385394061173391e-7,
    1.11738753912010371815e-6,
    -4.41673835845875056359e-6,
    1.64484480707288970893e-5,
    -5.75419501008210370398e-5,
    1.88502885095841655729e-4,
    -5.76375574538582365885e-4,
    1.63947561694133579842e-3,
    -4.32430999505057594430e-3,
    1.05464603945949983183e-2,
    -2.37374148058994688156e-2,
    4.93052842396707084878e-2,
    -9.49010970480476444210e-2,
    1.71620901522208775349e-1,
    -3.04682672343198398683e-1,
    6.76795274409476084995e-1,
];

/// Chebyshev coefficients for √x · exp(−x) · I₀(x) on (8, ∞), argument `32/x − 2`.
#[allow(clippy::excessive_precision)]
const BESSEL_I0_B: [f64; 25] = [
    -7.23318048787475395456e-18,
    -4.83050448594418207126e-18,
    4.46562142029675999901e-17,
    3.46122286769746109310e-17,
    -2.82762398051658348494e-16,
    -3.42548561967721913462e-16,
    1.77256013305652638360e-15,
    3.81168066935262242075e-15,
    -9.55484669882830764870e-15,
    -4.15056934728722208663e-14,
    1.54008621752140982691e-14,
    3.85277838274214270114e-13,
    7.18012445138366623367e-13,
    -1.79417853150680611778e-12,
    -1.32158118404477131188e-11,
    -3.14991652796324136454e-11,
    1.18891471078464383424e-11,
    4.94060238822496958910e-10,
    3.39623202570838634515e-9,
    2.26666899049817806459e-8,
    2.04891858946906374183e-7,
    2.89137052083475648297e-6,
    6.88975834691682398426e-5,
    3.36911647825569408990e-3,
    8.04490411014108831608e-1,
];

/// Evaluates a Chebyshev series by Clenshaw's recurrence.
///
/// Coefficients are stored highest order first; the zeroth coefficient is
/// halved, matching the cephes convention.
pub fn chebyshev_series(x: f64, coefficients: &[f64]) -> f64 {
    let Some((&first, rest)) = coefficients.split_first() else {
        return 0.0;
    };
    let mut b0 = first;
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for &c in rest {
        b2 = b1;
        b1 = b0;
        b0 = x * b1 - b2 + c;
    }
    0.5 * (b0 - b2)
}

/// Modified Bessel function of the first kind, order zero.
///
/// With `exp_weighted` set, returns `exp(−|x|) · I₀(x)`, which stays finite
/// for arguments where I₀ itself overflows.
///
/// # Algorithm
/// Chebyshev expansions on `|x| ≤ 8` and `|x| > 8`.
///
/// Reference: Moshier (1989), *Methods and Programs for Mathematical
/// Functions*, cephes `i0.c`.
///
/// # Examples
/// ```
/// use u_probdist::special::bessel_i0;
/// assert!((bessel_i0(0.0, false) - 1.0).abs() < 1e-15);
/// assert!((bessel_i0(1.0, false) - 1.2660658777520082).abs() < 1e-14);
/// ```
pub fn bessel_i0(x: f64, exp_weighted: bool) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    let x = x.abs();
    let weighted = if x <= 8.0 {
        chebyshev_series(x / 2.0 - 2.0, &BESSEL_I0_A)
    } else {
        chebyshev_series(32.0 / x - 2.0, &BESSEL_I0_B) / x.sqrt()
    };
    if exp_weighted {
        weighted
    } else {
        x.exp() * weighted
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn erf_erfinv_roundtrip(y in -0.999_f64..0.999) {
            let back = erf(erfinv(y));
            prop_assert!((back - y).abs() < 1e-13, "erf(erfinv({y})) = {back}");
        }

        #[test]
        fn erf_is_odd(x in 0.0_f64..6.0) {
            prop_assert_eq!(erf(-x), -erf(x));
        }

        #[test]
        fn erf_is_monotonic(x1 in -5.0_f64..5.0, x2 in -5.0_f64..5.0) {
            let (lo, hi) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
            prop_assert!(erf(lo) <= erf(hi) + 1e-15, "erf not monotonic");
        }

        #[test]
        fn normal_quantile_roundtrip(p in 1e-6_f64..0.999999) {
            let z = inverse_normal_cdf(p);
            let back = standard_normal_cdf(z);
            prop_assert!((back - p).abs() < 1e-12 * p.max(1e-3), "Φ(Φ⁻¹({p})) = {back}");
        }

        #[test]
        fn incomplete_beta_in_unit_interval(
            x in 0.0_f64..=1.0,
            a in 0.05_f64..50.0,
            b in 0.05_f64..50.0,
        ) {
            let v = regularized_incomplete_beta(x, a, b);
            prop_assert!((-1e-12..=1.0 + 1e-12).contains(&v), "I = {v}");
        }

        #[test]
        fn incomplete_beta_symmetry(x in 0.01_f64..0.99, a in 0.1_f64..20.0, b in 0.1_f64..20.0) {
            let lhs = regularized_incomplete_beta(x, a, b);
            let rhs = 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
            prop_assert!((lhs - rhs).abs() < 1e-10, "{lhs} vs {rhs}");
        }

        #[test]
        fn incomplete_gamma_sums_to_one(x in 0.0_f64..100.0, s in 0.05_f64..60.0) {
            let total = gamma_inc_lower(x, s, true) + gamma_inc_upper(x, s, true);
            prop_assert!((total - 1.0).abs() < 1e-12, "L+U = {total}");
        }
    }
}
